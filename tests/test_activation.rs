extern crate autoload;

use autoload::loader::{ActivationSwitch, Component, Resolver, Workspace};
use autoload::runner::ds::error::RuntimeError;
use autoload::runner::runtime::Runtime;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

// The process-wide switch is shared by every test in this binary, so the
// whole lifecycle lives in one test.
#[test]
fn test_global_switch_lifecycle() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("app/models")).unwrap();
    fs::write(
        temp.path().join("app/models/gear.unit"),
        "namespace Acme { define Gear }",
    )
    .unwrap();
    let resolver = Arc::new(Resolver::new(Arc::new(Workspace::new(Component::new(
        "Acme",
        temp.path(),
    )))));

    assert!(!ActivationSwitch::global().is_enabled());
    let mut runtime = Runtime::new();
    assert!(matches!(
        runtime.eval_str("use Acme::Gear"),
        Err(RuntimeError::NameError { .. })
    ));

    assert!(autoload::enable(Arc::clone(&resolver)));
    assert!(!autoload::enable(Arc::clone(&resolver)));
    assert!(ActivationSwitch::global().is_enabled());
    let gear = runtime.eval_str("use Acme::Gear").unwrap().unwrap();
    assert_eq!(gear.name.to_string(), "Acme::Gear");

    assert!(autoload::disable());
    assert!(!ActivationSwitch::global().is_enabled());
    assert!(!autoload::disable());

    let mut fresh = Runtime::new();
    assert!(matches!(
        fresh.eval_str("use Acme::Gear"),
        Err(RuntimeError::NameError { .. })
    ));
}
