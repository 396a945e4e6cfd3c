use std::collections::HashSet;
use std::sync::Arc;

use opal_core::interner::{Interned, Interner};
use opal_runtime::binder::{CallSiteBinder, SendKind};
use opal_runtime::cache::{BinderCacheTable, COMMON_SELECTORS};

fn make_binder(selector: Interned, name: &str, nargs: u8) -> Arc<CallSiteBinder> {
    Arc::new(CallSiteBinder::new(selector, name, None, SendKind::Normal { nargs }))
}

fn permanent_table(interner: &mut Interner) -> BinderCacheTable {
    let permanent: HashSet<Interned> = COMMON_SELECTORS.iter().map(|selector| interner.intern(selector)).collect();
    BinderCacheTable::new(permanent)
}

#[test]
fn resolution_is_idempotent_per_key() {
    let mut interner = Interner::with_capacity(8);
    let table = permanent_table(&mut interner);
    let selector = interner.intern("frobnicate:");

    let first = table.resolve_with(selector, SendKind::Normal { nargs: 1 }, || make_binder(selector, "frobnicate:", 1));
    let second = table.resolve_with(selector, SendKind::Normal { nargs: 1 }, || make_binder(selector, "frobnicate:", 1));
    assert!(Arc::ptr_eq(&first, &second));

    // A different send kind is a different key.
    let constant = table.resolve_with(selector, SendKind::Constant { nargs: 1 }, || {
        Arc::new(CallSiteBinder::new(selector, "frobnicate:", None, SendKind::Constant { nargs: 1 }))
    });
    assert!(!Arc::ptr_eq(&first, &constant));
}

#[test]
fn common_selector_binders_survive_having_no_users() {
    let mut interner = Interner::with_capacity(8);
    let table = permanent_table(&mut interner);
    let plus = interner.intern("+");

    let binder = table.resolve_with(plus, SendKind::Normal { nargs: 1 }, || make_binder(plus, "+", 1));
    drop(binder);
    table.purge();

    assert_eq!(table.permanent_len(), 1);
    assert!(table.get(plus, SendKind::Normal { nargs: 1 }).is_some());
}

#[test]
fn one_off_selectors_are_reclaimed_by_purge() {
    let mut interner = Interner::with_capacity(16);
    let table = permanent_table(&mut interner);
    let plus = interner.intern("+");
    let permanent = table.resolve_with(plus, SendKind::Normal { nargs: 1 }, || make_binder(plus, "+", 1));

    // A burst of one-off call sites, each dropped immediately after use.
    for i in 0..10_000 {
        let name = format!("oneOff{i}:");
        let selector = interner.intern(&name);
        let binder = table.resolve_with(selector, SendKind::Normal { nargs: 1 }, || make_binder(selector, &name, 1));
        drop(binder);
    }
    assert_eq!(table.evictable_len(), 10_000);

    table.purge();
    assert_eq!(table.evictable_len(), 0);
    assert_eq!(table.permanent_len(), 1);
    assert!(Arc::ptr_eq(
        &permanent,
        &table.get(plus, SendKind::Normal { nargs: 1 }).unwrap()
    ));
}

#[test]
fn reregistered_entries_survive_the_purge_that_follows() {
    let mut interner = Interner::with_capacity(8);
    let table = permanent_table(&mut interner);
    let selector = interner.intern("transient:");

    let first = table.resolve_with(selector, SendKind::Normal { nargs: 1 }, || make_binder(selector, "transient:", 1));
    drop(first);

    // Re-registered over the dead entry before any purge ran: the new
    // binder is live and the purge must keep it.
    let second = table.resolve_with(selector, SendKind::Normal { nargs: 1 }, || make_binder(selector, "transient:", 1));
    table.purge();
    assert!(Arc::ptr_eq(
        &second,
        &table.get(selector, SendKind::Normal { nargs: 1 }).unwrap()
    ));
}

#[test]
fn racing_registrations_converge_on_one_binder() {
    let mut interner = Interner::with_capacity(8);
    let table = permanent_table(&mut interner);
    let selector = interner.intern("contended:");

    let binders: Vec<Arc<CallSiteBinder>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = &table;
                scope.spawn(move || {
                    table.resolve_with(selector, SendKind::Normal { nargs: 1 }, || make_binder(selector, "contended:", 1))
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    for binder in &binders[1..] {
        assert!(Arc::ptr_eq(&binders[0], binder));
    }
}
