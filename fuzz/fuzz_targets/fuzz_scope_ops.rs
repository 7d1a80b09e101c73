#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_agent_core::oid::Oid;
use snmp_agent_core::scope::Scope;

fn take_oid(data: &mut &[u8]) -> Option<Oid> {
    let (&len, rest) = data.split_first()?;
    let len = usize::from(len % 6);
    if rest.len() < len {
        return None;
    }
    let (arcs, rest) = rest.split_at(len);
    *data = rest;
    Some(Oid::from_slice(&arcs.iter().map(|b| u32::from(b % 4)).collect::<Vec<_>>()))
}

fn take_scope(data: &mut &[u8]) -> Option<Scope> {
    let (&flags, rest) = data.split_first()?;
    *data = rest;
    let lower = take_oid(data)?;
    let upper = if flags & 4 != 0 { take_oid(data) } else { None };
    Some(Scope::new(lower, flags & 1 != 0, upper, flags & 2 != 0))
}

fuzz_target!(|data: &[u8]| {
    let mut data = data;
    let (Some(a), Some(b), Some(probe)) = (
        take_scope(&mut data),
        take_scope(&mut data),
        take_oid(&mut data),
    ) else {
        return;
    };

    assert_eq!(a.overlaps(&b), b.overlaps(&a));
    if let Some(both) = a.intersection(&b) {
        assert_eq!(both.contains(&probe), a.contains(&probe) && b.contains(&probe));
        assert!(a.covers(&both) && b.covers(&both));
    }

    let mut narrowed = a.clone();
    if narrowed.subtract(&b).is_ok() {
        assert!(!narrowed.overlaps(&b));
        if narrowed.contains(&probe) {
            assert!(a.contains(&probe));
        }
    }
});
