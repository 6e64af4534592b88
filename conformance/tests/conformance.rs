//! Runs every registered case in-process, once per transport backend.

use libtest_mimic::{Arguments, Failed, Trial};

use gatt_conformance::config::HarnessConfig;
use gatt_conformance::driver::run_test_case;
use gatt_conformance::tests;
use gatt_transport::TransportKind;

fn main() {
    let args = Arguments::from_args();

    let mut kinds = vec![TransportKind::Mem];
    if cfg!(unix) {
        kinds.push(TransportKind::Datagram);
    }

    let mut trials = Vec::new();
    for test in tests::all() {
        for &kind in &kinds {
            let config = HarnessConfig {
                transport: kind,
                ..HarnessConfig::from_env()
            };
            let case = test.to_case();
            trials.push(
                Trial::test(test.name, move || run_case(&case, &config))
                    .with_kind(kind.as_str()),
            );
        }
    }

    libtest_mimic::run(&args, trials).exit();
}

fn run_case(
    case: &gatt_conformance::testcase::TestCase,
    config: &HarnessConfig,
) -> Result<(), Failed> {
    let result = run_test_case(case, config);
    if result.passed {
        Ok(())
    } else {
        Err(result
            .error
            .unwrap_or_else(|| "failed without an error".to_string())
            .into())
    }
}
