use anyhow::Result;
use plugbox::{DuplicatePolicy, MultiRegistry, Registry, RegistryError, TypeRegistry};
use std::sync::Arc;

trait Exporter: Send + Sync {
    fn export(&self, value: i64) -> String;
}

struct Decimal;
struct Hexadecimal;

impl Exporter for Decimal {
    fn export(&self, value: i64) -> String {
        value.to_string()
    }
}

impl Exporter for Hexadecimal {
    fn export(&self, value: i64) -> String {
        format!("{:#x}", value)
    }
}

/// Consumer that receives its registry instead of reaching for a global.
struct ReportService<'a> {
    exporters: &'a Registry<Arc<dyn Exporter>>,
}

impl ReportService<'_> {
    fn render(&self, format: &str, value: i64) -> plugbox::Result<String> {
        Ok(self.exporters.get(format)?.export(value))
    }
}

fn exporters() -> Registry<Arc<dyn Exporter>> {
    let registry: Registry<Arc<dyn Exporter>> = Registry::new("exporters");
    registry.register("dec", Arc::new(Decimal)).unwrap();
    registry.register("hex", Arc::new(Hexadecimal)).unwrap();
    registry
}

#[test]
fn test_register_then_get_returns_same_implementation() -> Result<()> {
    let registry: Registry<Arc<dyn Exporter>> = Registry::new("exporters");
    let decimal: Arc<dyn Exporter> = Arc::new(Decimal);
    registry.register("dec", Arc::clone(&decimal))?;

    let fetched = registry.get("dec")?;
    assert!(Arc::ptr_eq(&fetched, &decimal));
    Ok(())
}

#[test]
fn test_many_keys_roundtrip() -> Result<()> {
    let registry = Registry::new("numbers");
    for i in 0..100u32 {
        registry.register(&format!("key-{}", i), i)?;
    }
    for i in 0..100u32 {
        assert_eq!(registry.get(&format!("key-{}", i))?, i);
    }
    assert_eq!(registry.keys().first().map(String::as_str), Some("key-0"));
    assert_eq!(registry.keys().last().map(String::as_str), Some("key-99"));
    Ok(())
}

#[test]
fn test_get_unregistered_is_an_error_not_a_default() {
    let registry = exporters();
    match registry.get("json") {
        Err(RegistryError::NotFound { registry, key }) => {
            assert_eq!(registry, "exporters");
            assert_eq!(key, "json");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("lookup of unknown key must fail"),
    }
}

#[test]
fn test_unregister_then_get_fails() -> Result<()> {
    let registry = exporters();
    registry.unregister("hex")?;
    assert!(registry.get("hex").is_err());
    assert_eq!(registry.keys(), vec!["dec"]);
    Ok(())
}

#[test]
fn test_both_duplicate_conventions() -> Result<()> {
    let strict: Registry<&str> = Registry::new("strict");
    strict.register("k", "first")?;
    assert!(matches!(
        strict.register("k", "second"),
        Err(RegistryError::DuplicateKey { .. })
    ));
    assert_eq!(strict.get("k")?, "first");

    let lenient: Registry<&str> = Registry::with_policy("lenient", DuplicatePolicy::Replace);
    lenient.register("k", "first")?;
    assert_eq!(lenient.register("k", "second")?, Some("first"));
    assert_eq!(lenient.get("k")?, "second");
    Ok(())
}

#[test]
fn test_registry_passed_to_consumer() -> Result<()> {
    let registry = exporters();
    let service = ReportService {
        exporters: &registry,
    };
    assert_eq!(service.render("dec", 255)?, "255");
    assert_eq!(service.render("hex", 255)?, "0xff");
    assert!(service.render("oct", 255).is_err());
    Ok(())
}

#[test]
fn test_shared_registry_across_threads() {
    let registry = Arc::new(Registry::new("shared"));
    let writers: Vec<_> = (0..4)
        .map(|t| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for i in 0..25 {
                    registry.register(&format!("t{}-{}", t, i), t * 100 + i).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(registry.len(), 100);
    assert_eq!(registry.get("t3-24").unwrap(), 324);
}

#[test]
fn test_multi_and_type_registries() -> Result<()> {
    let managers = MultiRegistry::new("package-managers");
    managers.register("rpm", "yum")?;
    managers.register("rpm", "dnf")?;
    assert_eq!(managers.get_all("rpm")?, vec!["yum", "dnf"]);
    managers.unregister("rpm")?;
    assert!(managers.get_all("rpm").is_err());

    let types = TypeRegistry::new();
    types.register(DuplicatePolicy::Replace)?;
    assert_eq!(*types.get::<DuplicatePolicy>()?, DuplicatePolicy::Replace);
    types.unregister::<DuplicatePolicy>()?;
    assert!(types.get::<DuplicatePolicy>().is_err());
    Ok(())
}
