use super::*;
use kernel_ir::{CompiledMode, KernelVersion, Uri};
use pretty_assertions::assert_eq;

fn with_library(uri: &str) -> Component {
    let mut component = KernelConfig::default().new_component();
    component.add_library(&Uri::new(uri)).unwrap();
    component
}

#[test]
fn test_default_config_targets_latest() {
    let config = KernelConfig::default();
    assert_eq!(config.version, KernelVersion::LATEST);
    assert_eq!(config.compiled_mode, CompiledMode::Strong);
}

#[test]
fn test_config_builders_shape_new_components() {
    let config = KernelConfig::default()
        .with_version(KernelVersion::V40)
        .with_compiled_mode(CompiledMode::Weak);
    let component = config.new_component();
    assert_eq!(component.version, KernelVersion::V40);
    assert_eq!(component.compiled_mode, CompiledMode::Weak);
    assert!(component.libraries().is_empty());
}

#[test]
fn test_parse_version() {
    assert_eq!(parse_version("41"), Ok(KernelVersion::V41));
    assert_eq!(parse_version(" 40\n"), Ok(KernelVersion::V40));
    assert_eq!(
        parse_version("39"),
        Err(ConfigError::UnsupportedVersion { version: 39 })
    );
    assert_eq!(
        parse_version("latest"),
        Err(ConfigError::InvalidVersion {
            value: "latest".to_owned()
        })
    );
}

// Only this test touches `KERNEL_VERSION`.
#[test]
fn test_config_from_env() {
    std::env::remove_var(VERSION_VAR);
    assert_eq!(KernelConfig::from_env(), Ok(KernelConfig::default()));

    std::env::set_var(VERSION_VAR, "40");
    assert_eq!(
        KernelConfig::from_env(),
        Ok(KernelConfig::default().with_version(KernelVersion::V40))
    );

    std::env::set_var(VERSION_VAR, "99");
    assert_eq!(
        KernelConfig::from_env(),
        Err(ConfigError::UnsupportedVersion { version: 99 })
    );
    std::env::remove_var(VERSION_VAR);
}

#[test]
fn test_serialize_all_concatenates_in_order() {
    let first = with_library("file:///a.dart");
    let second = with_library("file:///b.dart");
    let third = KernelConfig::default().new_component();

    let mut expected = serialize(&first).unwrap();
    expected.extend(serialize(&second).unwrap());
    expected.extend(serialize(&third).unwrap());

    let components = [first, second, third];
    assert_eq!(serialize_all(&components).unwrap(), expected);
}

#[test]
fn test_deserialize_returns_every_component() {
    let components = [with_library("file:///a.dart"), with_library("file:///b.dart")];
    let decoded = deserialize(&serialize_all(&components).unwrap()).unwrap();
    let uris: Vec<_> = decoded
        .iter()
        .map(|component| component.library_uri(component.libraries()[0]).unwrap().to_owned())
        .collect();
    assert_eq!(uris, ["file:///a.dart", "file:///b.dart"]);
}

#[test]
fn test_read_errors_surface_as_kernel_errors() {
    let err = deserialize(&[0, 0, 0, 0, 0, 0, 0, 41]).unwrap_err();
    assert!(
        matches!(err, KernelError::Read(ReadError::InvalidMagic { found: 0, .. })),
        "{err}"
    );
}

#[test]
fn test_identity_errors_convert() {
    fn add_twice(component: &mut Component) -> Result<(), KernelError> {
        component.add_library(&Uri::new("file:///a.dart"))?;
        component.add_library(&Uri::new("file:///a.dart"))?;
        Ok(())
    }
    let mut component = KernelConfig::default().new_component();
    assert!(matches!(
        add_twice(&mut component),
        Err(KernelError::Identity(IdentityError::NameAlreadyBound { .. }))
    ));
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}
