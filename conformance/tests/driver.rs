//! Failure paths of the run loop and teardown.

use std::time::Duration;

use gatt_conformance::config::HarnessConfig;
use gatt_conformance::driver::{Released, RunContext, run_test_case};
use gatt_conformance::peer::PeerState;
use gatt_conformance::script::Script;
use gatt_conformance::testcase::{HarnessError, Procedure, Role, TestCase};

fn config() -> HarnessConfig {
    HarnessConfig {
        stall_timeout: Duration::from_millis(200),
        ..HarnessConfig::default()
    }
}

fn case(role: Role, procedure: Procedure, pdus: &[&[u8]]) -> TestCase {
    TestCase::new("driver-test", role, Script::new(pdus.iter().copied())).with_procedure(procedure)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn mismatched_mtu_request_fails() {
    let case = case(Role::ClientUnderTest, Procedure::None, &[&[0x02, 0x17, 0x00]]);
    let result = run_test_case(&case, &config());
    assert!(!result.passed);
    let error = result.error.unwrap();
    assert!(error.contains("expected [02 17 00], got [02 00 02]"), "{}", error);
}

#[test]
fn length_mismatch_fails() {
    let case = case(Role::RawTransport, Procedure::None, &[&[0x02, 0x00]]);
    let result = run_test_case(&case, &config());
    assert!(!result.passed);
    assert!(result.error.unwrap().contains("expected 2 bytes, got 3"));
}

#[test]
fn procedure_error_fails_the_case() {
    let case = case(
        Role::RawTransport,
        Procedure::DiscoverPrimary,
        &[
            &[0x02, 0x00, 0x02],
            &[0x03, 0x00, 0x02],
            &[0x10, 0x01, 0x00, 0xff, 0xff, 0x00, 0x28],
            &[0x01, 0x10, 0x01, 0x00, 0x0e],
        ],
    );
    let result = run_test_case(&case, &config());
    assert!(!result.passed);
    assert!(result.error.unwrap().starts_with("procedure failed"));
}

#[test]
fn procedure_success_with_script_left_fails() {
    // Discovery ends on the first Error Response, two entries early.
    let case = case(
        Role::RawTransport,
        Procedure::DiscoverPrimary,
        &[
            &[0x02, 0x00, 0x02],
            &[0x03, 0x00, 0x02],
            &[0x10, 0x01, 0x00, 0xff, 0xff, 0x00, 0x28],
            &[0x01, 0x10, 0x01, 0x00, 0x0a],
            &[0x10, 0x01, 0x00, 0xff, 0xff, 0x00, 0x28],
            &[0x01, 0x10, 0x01, 0x00, 0x0a],
        ],
    );
    let result = run_test_case(&case, &config());
    assert!(!result.passed);
    let error = result.error.unwrap();
    assert!(error.contains("vector 4 of 6"), "{}", error);
}

#[test]
fn last_expected_message_ends_run_with_procedure_in_flight() {
    // Discovery is still waiting for its first response when the script ends.
    let case = case(
        Role::RawTransport,
        Procedure::DiscoverPrimary,
        &[
            &[0x02, 0x00, 0x02],
            &[0x03, 0x00, 0x02],
            &[0x10, 0x01, 0x00, 0xff, 0xff, 0x00, 0x28],
        ],
    );
    let result = run_test_case(&case, &config());
    assert!(result.passed, "{:?}", result.error);
}

#[test]
fn inbound_sentinel_abandons_the_procedure() {
    let rt = runtime();
    rt.block_on(async {
        let case = case(
            Role::RawTransport,
            Procedure::DiscoverPrimary,
            &[
                &[0x02, 0x00, 0x02],
                &[0x03, 0x00, 0x02],
                &[0x10, 0x01, 0x00, 0xff, 0xff, 0x00, 0x28],
            ],
        );
        let mut ctx = RunContext::create(case, config()).unwrap();
        ctx.run().await.unwrap();
        assert!(ctx.peer().is_complete());
        assert_eq!(ctx.peer().cursor(), 3);

        let released = ctx.teardown();
        assert!(!released.procedure);
        assert!(released.watch);
    });
}

#[test]
fn silent_collaborator_stalls() {
    // An unsolicited Read Response is dropped by the bearer, so the expected
    // Error Response never comes.
    let case = case(
        Role::ServerUnderTest,
        Procedure::None,
        &[&[0x0b, 0x00], &[0x01, 0x0a, 0x00, 0x00, 0x06]],
    );
    let rt = runtime();
    let result = rt.block_on(async {
        let mut ctx = RunContext::create(case, config()).unwrap();
        ctx.run().await
    });
    assert!(matches!(result, Err(HarnessError::Stalled { cursor: 1 })));
}

#[test]
fn raw_role_waits_for_inbound() {
    let rt = runtime();
    rt.block_on(async {
        let case = case(
            Role::RawTransport,
            Procedure::None,
            &[&[0x02, 0x00, 0x02]],
        );
        let mut ctx = RunContext::create(case, config()).unwrap();
        assert_eq!(ctx.peer().state(), PeerState::WaitingForInbound);
        ctx.run().await.unwrap();
        assert_eq!(ctx.peer().state(), PeerState::TerminatedSuccess);
        assert_eq!(ctx.peer().cursor(), 1);
    });
}

#[test]
fn teardown_runs_once() {
    let rt = runtime();
    rt.block_on(async {
        let case = case(
            Role::ClientUnderTest,
            Procedure::DiscoverPrimary,
            &[&[0x02, 0x00, 0x02], &[0x03, 0x00, 0x02]],
        );
        let mut ctx = RunContext::create(case, config()).unwrap();

        let first = ctx.teardown();
        assert_eq!(
            first,
            Released {
                watch: true,
                pending_send: false,
                procedure: true,
                client: true,
                att: true,
            }
        );
        assert!(!ctx.teardown().anything());
        assert!(matches!(ctx.run().await, Err(HarnessError::TornDown)));
    });
}

#[test]
fn teardown_cancels_a_pending_send() {
    let rt = runtime();
    rt.block_on(async {
        let case = case(
            Role::ServerUnderTest,
            Procedure::None,
            &[&[0x0a, 0x01, 0x00], &[0x01, 0x0a, 0x00, 0x00, 0x06]],
        );
        let mut ctx = RunContext::create(case, config()).unwrap();
        assert!(ctx.peer().send_pending());

        let released = ctx.teardown();
        assert!(released.pending_send);
        assert!(!ctx.peer().send_pending());
    });
}

#[cfg(unix)]
#[test]
fn datagram_transport_runs_the_mtu_case() {
    let case = case(Role::ClientUnderTest, Procedure::None, &[&[0x02, 0x00, 0x02]]);
    let config = HarnessConfig {
        transport: gatt_transport::TransportKind::Datagram,
        ..config()
    };
    let result = run_test_case(&case, &config);
    assert!(result.passed, "{:?}", result.error);
}
