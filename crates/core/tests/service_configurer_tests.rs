//! Contract tests for `ServiceConfigurer` against a scripted context.

mod common;

use std::sync::Arc;

use bedrock_core::container::list_contexts;
use bedrock_core::{
    Annotation, ApplicationContext, Component, ContextConfiguration, CoreError,
    GenericApplicationContext, ManagedObject, ModuleApplicationContext, PropertySource,
    ServiceConfigurer, ServiceEnvironment, SECURITY_FILTER_CHAIN,
};
use common::*;
use serde::Serialize;

#[derive(Serialize)]
struct ServiceConfiguration {
    name: String,
    port: u16,
}

fn service_configuration() -> ServiceConfiguration {
    ServiceConfiguration {
        name: "billing".to_string(),
        port: 8080,
    }
}

fn setup() -> (Arc<ServiceEnvironment>, ServiceConfigurer<ServiceEnvironment>) {
    let environment = Arc::new(ServiceEnvironment::new("test"));
    let configurer = ServiceConfigurer::for_environment(environment.clone());
    (environment, configurer)
}

#[test]
fn test_generic_application_context() {
    let (_, mut configurer) = setup();
    let context = configurer
        .with_context_type::<GenericApplicationContext>()
        .unwrap()
        .application_context()
        .unwrap();

    assert!(context
        .as_any()
        .downcast_ref::<GenericApplicationContext>()
        .is_some());
}

#[test]
fn test_module_application_context() {
    let (_, mut configurer) = setup();
    let context = configurer
        .with_context_type::<ModuleApplicationContext>()
        .unwrap()
        .application_context()
        .unwrap();

    assert!(context
        .as_any()
        .downcast_ref::<ModuleApplicationContext>()
        .is_some());
}

#[test]
fn test_context_configuration_with_generic_application_context() {
    let (_, mut configurer) = setup();
    let config = ContextConfiguration::new("generic");

    let context = configurer
        .with_context_configuration(&config)
        .unwrap()
        .application_context()
        .unwrap();

    assert!(context
        .as_any()
        .downcast_ref::<GenericApplicationContext>()
        .is_some());
}

#[test]
fn test_context_configuration_with_module_application_context() {
    let (_, mut configurer) = setup();
    let config = ContextConfiguration::new("module");

    let context = configurer
        .with_context_configuration(&config)
        .unwrap()
        .application_context()
        .unwrap();

    assert!(context
        .as_any()
        .downcast_ref::<ModuleApplicationContext>()
        .is_some());
}

#[test]
fn test_context_configuration_passes_locations_and_profiles_through() {
    let (_, mut configurer) = setup();
    let config = ContextConfiguration::new("generic")
        .with_config_location("a")
        .with_config_location("a")
        .with_profile(" ");

    let context = configurer
        .with_context_configuration(&config)
        .unwrap()
        .application_context()
        .unwrap();

    assert_eq!(context.config_locations(), vec!["a", "a"]);
    assert_eq!(context.active_profiles(), vec![" "]);
}

#[test]
fn test_builtin_contexts_are_registered() {
    let names: Vec<&str> = list_contexts().into_iter().map(|(name, _)| name).collect();
    assert!(names.contains(&"generic"));
    assert!(names.contains(&"module"));
}

#[test]
fn test_context_configuration_with_unknown_application_context() {
    let (_, mut configurer) = setup();
    let config = ContextConfiguration::new("abstract");

    let error = configurer.with_context_configuration(&config).unwrap_err();
    assert!(error.is_instantiation());
    assert!(configurer.application_context().is_none());
}

#[test]
fn test_reset_root_context_fails() {
    let (_, mut configurer) = setup();
    let context: Arc<dyn ApplicationContext> = Arc::new(MockContext::new());

    configurer.with_context(context.clone()).unwrap();
    let error = configurer.with_context(context).unwrap_err();
    assert!(error.is_invalid_state());
}

#[test]
fn test_rebinding_fails_regardless_of_context_type() {
    let (_, mut configurer) = setup();
    configurer
        .with_context_type::<ModuleApplicationContext>()
        .unwrap();

    assert!(configurer
        .with_context_type::<GenericApplicationContext>()
        .unwrap_err()
        .is_invalid_state());
    assert!(configurer
        .with_context_configuration(&ContextConfiguration::new("generic"))
        .unwrap_err()
        .is_invalid_state());
}

#[test]
fn test_register_property_source_after_refresh_fails() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::active());

    let error = configurer
        .with_context(context.clone())
        .unwrap()
        .register_configuration_property_source("dw", &service_configuration())
        .unwrap_err();

    assert!(error.is_invalid_state());
    assert!(context.property_sources().is_empty());
}

#[test]
fn test_register_named_value_after_refresh_fails() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::active());
    configurer.with_context(context.clone()).unwrap();

    assert!(configurer
        .register_environment("env")
        .unwrap_err()
        .is_invalid_state());
    assert!(configurer
        .register_named_value("answer", Component::of(42u32))
        .unwrap_err()
        .is_invalid_state());
    assert!(context.singleton("env").is_none());
}

#[test]
fn test_register_configuration_bean_after_refresh_fails() {
    let (_, mut configurer) = setup();
    configurer
        .with_context(Arc::new(MockContext::active()))
        .unwrap();

    let error = configurer
        .register_configuration_bean("dw", Arc::new(service_configuration()))
        .unwrap_err();
    assert!(error.is_invalid_state());
}

#[test]
fn test_register_environment_into_mock_context() {
    let (environment, mut configurer) = setup();
    let context = Arc::new(MockContext::new());

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_environment("env")
        .unwrap();

    let registered = context.singleton("env").unwrap();
    let registered = registered.downcast::<ServiceEnvironment>().unwrap();
    assert!(Arc::ptr_eq(&registered, &environment));
}

#[test]
fn test_register_configuration_property_source_adds_first() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::new());
    context
        .property_sources()
        .add_last(PropertySource::new("system").with_property("port", 80))
        .unwrap();

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_configuration_property_source("dw", &service_configuration())
        .unwrap();

    let sources = context.property_sources();
    assert_eq!(sources.names(), vec!["dw", "system"]);
    assert_eq!(sources.property_as_string("port").as_deref(), Some("8080"));
    assert_eq!(sources.property_as_string("name").as_deref(), Some("billing"));
}

// a configuration object can only be exposed through a parent the configurer
// creates itself
#[test]
fn test_register_configuration_bean_with_existing_parent_fails() {
    let (_, mut configurer) = setup();
    let context = MockContext::new().with_parent(Arc::new(MockContext::new()));

    let error = configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_configuration_bean("dw", Arc::new(service_configuration()))
        .unwrap_err();

    assert!(error.is_registration_conflict());
}

#[test]
fn test_register_named_value_into_parented_context_is_allowed() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::new().with_parent(Arc::new(MockContext::new())));

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_environment("env")
        .unwrap();
    assert!(context.singleton("env").is_some());
}

#[test]
fn test_register_configuration_bean_sets_parent() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::new());
    let configuration = Arc::new(service_configuration());

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_configuration_bean("dw", configuration.clone())
        .unwrap();

    let parent = context.parent().unwrap();
    assert!(parent.is_active());
    let registered = parent
        .get_component("dw")
        .unwrap()
        .downcast::<ServiceConfiguration>()
        .unwrap();
    assert!(Arc::ptr_eq(&registered, &configuration));

    // a second configuration object would need a second parent
    let error = configurer
        .register_configuration_bean("other", configuration)
        .unwrap_err();
    assert!(error.is_registration_conflict());
}

#[test]
fn test_register_health_checks_refreshes_context() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::new());

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_health_checks()
        .unwrap();

    assert_eq!(context.refresh_count(), 1);
}

#[test]
fn test_register_health_checks_registers() {
    let (environment, mut configurer) = setup();
    let check = Arc::new(DatabaseCheck);
    let context = MockContext::new().with_component(
        "o",
        Component::from_arc(check.clone()).health_check().build(),
    );

    configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_health_checks()
        .unwrap();

    let checks = environment.health_checks();
    assert_eq!(checks.len(), 1);
    assert!(same_object(&checks[0], &check));
}

#[test]
fn test_register_providers_refreshes_context() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::new());

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_providers()
        .unwrap();

    assert_eq!(context.refresh_count(), 1);
}

#[test]
fn test_register_providers_registers() {
    let (environment, mut configurer) = setup();
    let provider = Arc::new(JsonProvider);
    let context = MockContext::new().with_component(
        "o",
        Component::from_arc(provider.clone())
            .annotated(Annotation::Provider)
            .build(),
    );

    configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_providers()
        .unwrap();

    let providers = environment.providers();
    assert_eq!(providers.len(), 1);
    assert!(same_object(&providers[0], &provider));
}

#[test]
fn test_register_injectable_providers_refreshes_context() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::new());

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_injectable_providers()
        .unwrap();

    assert_eq!(context.refresh_count(), 1);
}

#[test]
fn test_register_injectable_providers_registers() {
    let (environment, mut configurer) = setup();
    let provider = Arc::new(SessionProvider);
    let context = MockContext::new().with_component(
        "o",
        Component::from_arc(provider.clone())
            .injectable_provider()
            .build(),
    );

    configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_injectable_providers()
        .unwrap();

    let providers = environment.providers();
    assert_eq!(providers.len(), 1);
    assert!(same_object(&providers[0], &provider));
}

#[test]
fn test_register_resources_refreshes_context() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::new());

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_resources()
        .unwrap();

    assert_eq!(context.refresh_count(), 1);
}

#[test]
fn test_register_resources_registers() {
    let (environment, mut configurer) = setup();
    let resource = Arc::new(UserResource);
    let context = MockContext::new().with_component(
        "o",
        Component::from_arc(resource.clone())
            .annotated(Annotation::Path)
            .build(),
    );

    configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_resources()
        .unwrap();

    let resources = environment.resources();
    assert_eq!(resources.len(), 1);
    assert!(same_object(&resources[0], &resource));
    assert!(environment.providers().is_empty());
}

#[test]
fn test_register_tasks_refreshes_context() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::new());

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_tasks()
        .unwrap();

    assert_eq!(context.refresh_count(), 1);
}

#[test]
fn test_register_tasks_registers() {
    let (environment, mut configurer) = setup();
    let task = Arc::new(GarbageCollectionTask);
    let context = MockContext::new()
        .with_component("o", Component::from_arc(task.clone()).task().build());

    configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_tasks()
        .unwrap();

    assert_eq!(environment.task_names(), vec!["gc"]);
    assert!(same_object(&environment.task("gc").unwrap(), &task));
}

#[test]
fn test_register_managed_refreshes_context() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::new());

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_managed()
        .unwrap();

    assert_eq!(context.refresh_count(), 1);
}

#[test]
fn test_register_managed_registers() {
    let (environment, mut configurer) = setup();
    let pool = Arc::new(ConnectionPool::default());
    let context = MockContext::new()
        .with_component("o", Component::from_arc(pool.clone()).managed().build());

    configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_managed()
        .unwrap();

    let managed = environment.managed_objects();
    assert_eq!(managed.len(), 1);
    assert!(!managed[0].is_life_cycle());
    match &managed[0] {
        ManagedObject::Managed(object) => assert!(same_object(object, &pool)),
        other => panic!("expected a managed object, got {:?}", other),
    }
}

#[test]
fn test_register_life_cycles_refreshes_context() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::new());

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_life_cycles()
        .unwrap();

    assert_eq!(context.refresh_count(), 1);
}

#[test]
fn test_register_life_cycles_registers() {
    let (environment, mut configurer) = setup();
    let connector = Arc::new(Connector::default());
    let context = MockContext::new().with_component(
        "o",
        Component::from_arc(connector.clone()).life_cycle().build(),
    );

    configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_life_cycles()
        .unwrap();

    let managed = environment.managed_objects();
    assert_eq!(managed.len(), 1);
    assert!(managed[0].is_life_cycle());
    match &managed[0] {
        ManagedObject::LifeCycle(object) => assert!(same_object(object, &connector)),
        other => panic!("expected a life cycle, got {:?}", other),
    }
}

#[test]
fn test_sweep_does_not_refresh_active_context() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::active());

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_all()
        .unwrap();

    assert_eq!(context.refresh_count(), 0);
}

#[test]
fn test_sweeps_refresh_only_once() {
    let (_, mut configurer) = setup();
    let context = Arc::new(MockContext::new());

    configurer
        .with_context(context.clone())
        .unwrap()
        .register_all()
        .unwrap()
        .activate()
        .unwrap();

    assert_eq!(context.refresh_count(), 1);
}

#[test]
fn test_repeated_sweep_registers_again() {
    let (environment, mut configurer) = setup();
    let context = MockContext::new()
        .with_component("o", Component::builder(DatabaseCheck).health_check().build());

    configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_health_checks()
        .unwrap()
        .register_health_checks()
        .unwrap();

    assert_eq!(environment.health_checks().len(), 2);
}

#[test]
fn test_sweep_rejects_component_without_capability() {
    let (_, mut configurer) = setup();
    let context = MockContext::ignoring_markers().with_component("o", Component::of(UserResource));

    let error = configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_tasks()
        .unwrap_err();

    assert!(matches!(error, CoreError::ComponentNotOfRequiredType { .. }));
}

#[test]
fn test_injectable_provider_sweep_rejects_component_without_provider() {
    let (environment, mut configurer) = setup();
    let context = MockContext::ignoring_markers().with_component("o", Component::of(JsonProvider));

    let error = configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_injectable_providers()
        .unwrap_err();

    assert!(matches!(error, CoreError::ComponentNotOfRequiredType { .. }));
    assert!(environment.providers().is_empty());
}

#[test]
fn test_register_security() {
    let (environment, mut configurer) = setup();
    let filter = Arc::new(SecurityFilter);
    let context = MockContext::new().with_component(
        SECURITY_FILTER_CHAIN,
        Component::from_arc(filter.clone()).filter().build(),
    );

    configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_security_filter("/*")
        .unwrap();

    let filters = environment.filters();
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0].url_pattern, "/*");
    assert!(same_object(&filters[0].filter, &filter));
}

#[test]
fn test_register_security_without_filter_fails() {
    let (environment, mut configurer) = setup();

    let error = configurer
        .with_context(Arc::new(MockContext::new()))
        .unwrap()
        .register_security_filter("/*")
        .unwrap_err();

    assert!(error.is_not_found());
    assert!(environment.filters().is_empty());
}

#[test]
fn test_register_security_with_non_filter_component_fails() {
    let (_, mut configurer) = setup();
    let context = MockContext::new()
        .with_component(SECURITY_FILTER_CHAIN, Component::of(UserResource));

    let error = configurer
        .with_context(Arc::new(context))
        .unwrap()
        .register_security_filter("/*")
        .unwrap_err();

    assert!(matches!(error, CoreError::ComponentNotOfRequiredType { .. }));
}
