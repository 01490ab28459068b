//! Shared fixture classes for the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde_json::json;
use weft_engine::{
    ClassDefinition, ClassLoader, MethodReflection, ObjectContainer, ParameterReflection,
    ReflectionClassFactory, RestoreContext, SupportsExternalRestore,
};

pub const TRANSPORT: &str = "Acme\\Transport";
pub const TRANSPORT_INTERFACE: &str = "Acme\\TransportInterface";
pub const LOGGER: &str = "Acme\\Logger";
pub const MAILER: &str = "Acme\\Mailer";
pub const NEWSLETTER: &str = "Acme\\Newsletter";
pub const REPORTER: &str = "Acme\\Reporter";
pub const STRICT_REPORTER: &str = "Acme\\StrictReporter";
pub const MISSING_CACHE: &str = "Acme\\MissingCache";
pub const CHICKEN: &str = "Acme\\Chicken";
pub const EGG: &str = "Acme\\Egg";
pub const CART: &str = "Acme\\Cart";
pub const GATEWAY: &str = "Acme\\Gateway";

static NEXT_TRANSPORT_ID: AtomicU32 = AtomicU32::new(1);

pub struct Transport {
    pub id: u32,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            id: NEXT_TRANSPORT_ID.fetch_add(1, Ordering::SeqCst),
        }
    }
}

#[derive(Default)]
pub struct Logger;

pub struct Mailer {
    pub transport: Arc<Transport>,
    pub port: i64,
    pub logger: Option<Arc<Logger>>,
    pub sender: Option<String>,
    pub initialized: u32,
    pub logger_at_init: bool,
}

pub struct Newsletter {
    pub subject: String,
    pub transport: Arc<Transport>,
}

#[derive(Default)]
pub struct Reporter {
    pub cache_injected: bool,
}

pub struct Chicken;

pub struct Egg;

pub struct Cart {
    pub items: Vec<String>,
    pub logger: Arc<Logger>,
}

pub struct Gateway {
    pub cart: Arc<Cart>,
}

impl SupportsExternalRestore for Gateway {
    fn restore_from(context: &RestoreContext<'_>) -> Result<Self, String> {
        let cart = context
            .object_manager()
            .get_object(CART)
            .map_err(|e| e.to_string())?
            .downcast::<Cart>()
            .ok_or("cart has an unexpected type")?;
        Ok(Self { cart })
    }
}

impl SupportsExternalRestore for Cart {
    fn restore_from(context: &RestoreContext<'_>) -> Result<Self, String> {
        let items = match context.property("items").and_then(|v| v.as_literal()) {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or("items must be strings"))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err("items must be a list".to_string()),
            None => Vec::new(),
        };
        let logger = context
            .object_manager()
            .get_object(LOGGER)
            .map_err(|e| e.to_string())?
            .downcast::<Logger>()
            .ok_or("logger has an unexpected type")?;
        Ok(Self { items, logger })
    }
}

/// Build a class loader with every fixture class registered
pub fn class_loader() -> ClassLoader {
    let loader = ClassLoader::new();

    loader.register_interface(TRANSPORT_INTERFACE);
    loader.register(
        ClassDefinition::<Transport>::new(TRANSPORT)
            .implements(TRANSPORT_INTERFACE)
            .default_constructor(),
    );
    loader.register(ClassDefinition::<Logger>::new(LOGGER).default_constructor());

    loader.register(
        ClassDefinition::<Mailer>::new(MAILER)
            .constructor(
                vec![
                    ParameterReflection::object("transport", TRANSPORT),
                    ParameterReflection::scalar("port", "int").with_default(json!(25)),
                ],
                |args| {
                    Ok(Mailer {
                        transport: args.object::<Transport>(0)?,
                        port: args.int(1)?,
                        logger: None,
                        sender: None,
                        initialized: 0,
                        logger_at_init: false,
                    })
                },
            )
            .method(
                MethodReflection::new("injectLogger")
                    .with_parameter(ParameterReflection::object("logger", LOGGER)),
                |mailer, args| {
                    mailer.logger = Some(args.object::<Logger>(0)?);
                    Ok(())
                },
            )
            .method(
                MethodReflection::new("setSender")
                    .with_parameter(ParameterReflection::scalar("sender", "string")),
                |mailer, args| {
                    mailer.sender = Some(args.string(0)?);
                    Ok(())
                },
            )
            .method(MethodReflection::new("initializeObject"), |mailer, _| {
                mailer.initialized += 1;
                mailer.logger_at_init = mailer.logger.is_some();
                Ok(())
            }),
    );

    loader.register(ClassDefinition::<Newsletter>::new(NEWSLETTER).constructor(
        vec![
            ParameterReflection::scalar("subject", "string"),
            ParameterReflection::object("transport", TRANSPORT),
        ],
        |args| {
            Ok(Newsletter {
                subject: args.string(0)?,
                transport: args.object::<Transport>(1)?,
            })
        },
    ));

    loader.register(
        ClassDefinition::<Reporter>::new(REPORTER)
            .default_constructor()
            .method(
                MethodReflection::new("injectCache")
                    .with_parameter(ParameterReflection::object("cache", MISSING_CACHE))
                    .tagged("optional"),
                |reporter, _| {
                    reporter.cache_injected = true;
                    Ok(())
                },
            ),
    );
    loader.register(
        ClassDefinition::<Reporter>::new(STRICT_REPORTER)
            .default_constructor()
            .method(
                MethodReflection::new("injectCache")
                    .with_parameter(ParameterReflection::object("cache", MISSING_CACHE)),
                |reporter, _| {
                    reporter.cache_injected = true;
                    Ok(())
                },
            ),
    );

    loader.register(ClassDefinition::<Chicken>::new(CHICKEN).constructor(
        vec![ParameterReflection::object("egg", EGG)],
        |args| {
            args.object::<Egg>(0)?;
            Ok(Chicken)
        },
    ));
    loader.register(ClassDefinition::<Egg>::new(EGG).constructor(
        vec![ParameterReflection::object("chicken", CHICKEN)],
        |args| {
            args.object::<Chicken>(0)?;
            Ok(Egg)
        },
    ));

    loader.register(
        ClassDefinition::<Cart>::new(CART)
            .constructor(vec![], |_| {
                Ok(Cart {
                    items: Vec::new(),
                    logger: Arc::new(Logger),
                })
            })
            .restorable(),
    );
    loader.register(
        ClassDefinition::<Gateway>::new(GATEWAY)
            .constructor(vec![ParameterReflection::object("cart", CART)], |args| {
                Ok(Gateway {
                    cart: args.object::<Cart>(0)?,
                })
            })
            .restorable(),
    );

    loader
}

/// A reflection cache over the fixture classes
pub fn reflections() -> Arc<ReflectionClassFactory> {
    Arc::new(ReflectionClassFactory::new(Arc::new(class_loader())))
}

/// A container over the fixture classes
pub fn container() -> ObjectContainer {
    ObjectContainer::new(reflections())
}
