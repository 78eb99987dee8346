//! End-to-end behaviour through the process-wide catalog.

use std::sync::Arc;
use std::thread;

use cerror::{catalog, renew, specify, Catalog, CError, ErrorLike, MultiError, RenderMode};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

static CATALOG: Lazy<&'static Catalog> = Lazy::new(|| {
    catalog::init(|b| {
        b.register("DAS", 1001, "failed to connect to %s: %s")?;
        b.register("DAS", 1002, "query %q failed on shard %d")?;
        b.register("CFG", 1, "x=%s")?;
        b.register("API", 500, "request %s failed")?;
        Ok(())
    })
    .expect("catalog installs once")
});

fn cat() -> &'static Catalog {
    *CATALOG
}

#[test]
fn scenario_connect_failure_compact() {
    let mut err = CError::new(cat().lookup("DAS", 1001), None);
    specify!(err, "db1", "timeout");
    assert_eq!(err.render(RenderMode::Compact), "DAS-1001: failed to connect to db1: timeout");
    assert_eq!(err.to_string(), "DAS-1001: failed to connect to db1: timeout");
    assert_eq!(err.code(), "DAS-1001");
}

#[test]
fn global_lookup_matches_installed_table() {
    let entry = catalog::lookup("DAS", 1002);
    assert!(std::ptr::eq(entry, cat().lookup("DAS", 1002)));
    assert_eq!(catalog::global().len(), 4);
}

#[test]
fn second_install_is_rejected() {
    let _ = cat();
    let again = catalog::init(|b| {
        b.register("X", 1, "x")?;
        Ok(())
    });
    assert_eq!(again.unwrap_err(), cerror::CatalogError::AlreadyInstalled);
}

#[test]
#[should_panic(expected = "unregistered error catalog entry NOPE-1")]
fn unregistered_lookup_panics() {
    let _ = cat();
    catalog::lookup("NOPE", 1);
}

#[test]
fn empty_aggregate_is_absent() {
    let multi = MultiError::new();
    assert_eq!(multi.len(), 0);
    assert!(multi.error_or_nil().is_none());
}

#[test]
fn absent_identity_is_still_aggregated() {
    let mut multi = MultiError::new();
    multi.append(CError::from_parts("X", 0, "nothing", None));
    assert_eq!(multi.len(), 1);
    assert!(multi.wrapped_errors()[0].clone().error_or_nil().is_none());
    assert!(multi.error_or_nil().is_some());
}

#[test]
fn renew_isolation_from_catalog_prototype() {
    let proto = CError::new(cat().lookup("CFG", 1), None);
    let a = renew!(proto, "1");
    let b = renew!(proto, "2");
    assert_eq!(a.to_string(), "CFG-1: x=1");
    assert_eq!(b.to_string(), "CFG-1: x=2");
    assert_eq!(proto.to_string(), "CFG-1: x=%s");
}

#[test]
fn concurrent_renew_on_shared_prototype() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 500;

    let proto = Arc::new(CError::new(cat().lookup("CFG", 1), None));
    let collected = Mutex::new(MultiError::new());

    thread::scope(|s| {
        for t in 0..THREADS {
            let proto = Arc::clone(&proto);
            let collected = &collected;
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    let tag = format!("{}-{}", t, i);
                    let e = renew!(proto, tag);
                    assert_eq!(e.message(), format!("x={}", tag));
                    assert!(e.own_stack().ptr_eq(proto.own_stack()));
                    if i % 100 == 0 {
                        collected.lock().append(e);
                    }
                }
            });
        }
    });

    assert_eq!(proto.message(), "x=%s");
    let multi = collected.into_inner();
    assert_eq!(multi.len(), THREADS * PER_THREAD / 100);
    for child in multi.iter() {
        let node = child.as_node().expect("node");
        assert!(node.message().starts_with("x="));
        assert_ne!(node.message(), "x=%s");
    }
}

#[test]
fn parallel_failures_merge_into_one_value() {
    let connect = CError::new(cat().lookup("DAS", 1001), None);
    let collected = Mutex::new(MultiError::new());

    thread::scope(|s| {
        for db in ["db1", "db2", "db3"] {
            let connect = &connect;
            let collected = &collected;
            s.spawn(move || {
                let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout");
                let e = renew!(connect, db, "timeout").wrap(io);
                collected.lock().append(e);
            });
        }
    });

    let multi = collected.into_inner().error_or_nil().expect("three failures");
    assert_eq!(multi.len(), 3);

    let top = renew!(CError::new(cat().lookup("API", 500), Some(multi.into())), "/orders");
    let text = top.render(RenderMode::Compact);
    assert!(text.starts_with("API-500: request /orders failed\n"));
    for db in ["db1", "db2", "db3"] {
        assert!(text.contains(&format!("DAS-1001: failed to connect to {}: timeout\ntimeout", db)));
    }
}

#[test]
fn three_nodes_compact_in_insertion_order() {
    let q = CError::new(cat().lookup("DAS", 1002), None);
    let mut multi = MultiError::new();
    multi.append(renew!(q, "select 1", 1));
    multi.append(renew!(q, "select 2", 2));
    multi.append(renew!(q, "select 3", 3));
    assert_eq!(
        multi.render(RenderMode::Compact),
        "DAS-1002: query \"select 1\" failed on shard 1\n\
         DAS-1002: query \"select 2\" failed on shard 2\n\
         DAS-1002: query \"select 3\" failed on shard 3"
    );
}

#[test]
fn stack_inherited_through_chain() {
    let inner = CError::new(cat().lookup("DAS", 1001), None);
    let outer = CError::new(cat().lookup("API", 500), Some(inner.clone().into()));
    assert_eq!(outer.stack_trace().frames(), inner.stack_trace().frames());
    assert!(outer.stack_trace().ptr_eq(&inner.stack_trace()));

    let verbose = outer.render(RenderMode::Verbose);
    let frame_lines = verbose.lines().filter(|l| l.starts_with('\t')).count();
    assert_eq!(frame_lines, inner.stack_trace().len());
}

#[test]
fn traced_primitive_stack_is_reused() {
    let prim = ErrorLike::traced(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
    let stack = prim.stack_trace().expect("traced");
    let node = CError::new(cat().lookup("DAS", 1001), Some(prim));
    assert!(node.stack_trace().ptr_eq(&stack));
}
