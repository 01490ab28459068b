//! Integration tests for the object container
//!
//! Tests scopes, implicit class configurations and the session store.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use common::*;
use serde_json::json;
use weft_engine::{
    InMemorySessionStore, Instance, ObjectConfiguration, ObjectContainer, ObjectError,
    ObjectFactory, ObjectManager, Scope, SessionStore, Value,
};

fn configuration(object_name: &str, class_name: Option<&str>, scope: Scope) -> ObjectConfiguration {
    let mut configuration = ObjectConfiguration::new(object_name, class_name);
    configuration.set_scope(scope);
    configuration
}

#[test]
fn test_singleton_scope_is_shared() {
    let container = container();

    let first = container.get_object(TRANSPORT).unwrap();
    let second = container.get_object(TRANSPORT).unwrap();
    assert_eq!(first, second);
    assert!(container.is_instantiated(TRANSPORT));
}

#[test]
fn test_prototype_scope_builds_fresh_objects() {
    let container = container();
    container.register(configuration(TRANSPORT, None, Scope::Prototype));

    let first = container.get_object(TRANSPORT).unwrap();
    let second = container.get_object(TRANSPORT).unwrap();
    assert_ne!(first, second);
    assert_ne!(
        first.downcast_ref::<Transport>().unwrap().id,
        second.downcast_ref::<Transport>().unwrap().id
    );
    assert!(!container.is_instantiated(TRANSPORT));
}

#[test]
fn test_factory_always_creates() {
    let container = container();

    let singleton = container.get_object(TRANSPORT).unwrap();
    let created = container.create(TRANSPORT, &[]).unwrap();
    assert_ne!(singleton, created);
    assert_eq!(container.get_object(TRANSPORT).unwrap(), singleton);
}

#[test]
fn test_session_scope_uses_session_store() {
    let session = Arc::new(InMemorySessionStore::new());
    let container = ObjectContainer::with_session_store(reflections(), session.clone());
    container.register(configuration(LOGGER, None, Scope::Session));

    let logger = container.get_object(LOGGER).unwrap();
    assert_eq!(session.len(), 1);
    assert_eq!(session.get(LOGGER).unwrap(), logger);
    assert_eq!(container.get_object(LOGGER).unwrap(), logger);

    session.remove(LOGGER);
    assert_ne!(container.get_object(LOGGER).unwrap(), logger);
}

#[test]
fn test_reconstituted_session_object_is_stored() {
    let container = container();
    container.register(configuration(CART, None, Scope::Session));

    let mut properties = BTreeMap::new();
    properties.insert("items".to_string(), Value::from(json!(["tea"])));
    let cart = container.reconstitute_object(CART, &properties).unwrap();

    assert_eq!(container.session_store().get(CART).unwrap(), cart);
    assert_eq!(container.get_object(CART).unwrap(), cart);
}

#[test]
fn test_interface_configured_with_implementation() {
    let container = container();

    assert_eq!(
        container.get_object(TRANSPORT_INTERFACE).unwrap_err(),
        ObjectError::UnknownObject(TRANSPORT_INTERFACE.to_string())
    );

    container.register(configuration(
        TRANSPORT_INTERFACE,
        Some(TRANSPORT),
        Scope::Singleton,
    ));
    let transport = container.get_object(TRANSPORT_INTERFACE).unwrap();
    assert_eq!(transport.class_name(), TRANSPORT);
    assert!(transport.is::<Transport>());
}

#[test]
fn test_implicit_class_configuration() {
    let container = container();
    assert!(!container.is_registered(LOGGER));

    let configuration = container.configuration(LOGGER).unwrap();
    assert_eq!(configuration.class_name(), LOGGER);
    assert_eq!(configuration.scope(), Scope::Singleton);
    assert_eq!(
        configuration.configuration_source_hint(),
        "implicit class configuration"
    );
    assert!(container.is_registered(LOGGER));
}

#[test]
fn test_unknown_object() {
    let container = container();
    assert_eq!(
        container.get_object("Acme\\Nothing").unwrap_err(),
        ObjectError::UnknownObject("Acme\\Nothing".to_string())
    );
}

#[test]
fn test_register_replaces_singleton() {
    let container = container();
    let before = container.get_object(TRANSPORT).unwrap();

    container.register(ObjectConfiguration::new(TRANSPORT, None));
    assert!(!container.is_instantiated(TRANSPORT));
    assert_ne!(container.get_object(TRANSPORT).unwrap(), before);
    assert_eq!(container.registered_object_names(), vec![TRANSPORT]);
}

#[test]
fn test_concurrent_singleton_access() {
    let container = Arc::new(container());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = Arc::clone(&container);
            thread::spawn(move || container.get_object(LOGGER).unwrap())
        })
        .collect();
    let instances: Vec<Instance> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let cached = container.get_object(LOGGER).unwrap();
    assert!(instances.iter().all(|instance| *instance == cached));
}
