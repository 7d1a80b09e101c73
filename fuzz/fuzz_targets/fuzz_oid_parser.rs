#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_agent_core::oid::Oid;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(oid) = Oid::parse(s) {
        // a parsed OID prints back to something that parses to the same OID
        let again = Oid::parse(&oid.to_string());
        assert_eq!(again.ok(), Some(oid));
    }
});
