//! Primary service discovery.

use gatt_proto::Uuid;

use crate::ConformanceTest;

const UUID_6085: Uuid = Uuid::Uuid128([
    0xef, 0xcd, 0xab, 0x89, 0x67, 0x45, 0x23, 0x01, 0x00, 0x00, 0x00, 0x00, 0x85, 0x60, 0x00, 0x00,
]);

pub const TESTS: &[ConformanceTest] = &[
    define_test!("/TP/GAD/CL/BV-01-C", RawTransport, DiscoverPrimary, None, [
        raw_pdu!(0x02, 0x00, 0x02),
        raw_pdu!(0x03, 0x00, 0x02),
        raw_pdu!(0x10, 0x01, 0x00, 0xff, 0xff, 0x00, 0x28),
        raw_pdu!(
            0x11, 0x06, 0x10, 0x00, 0x13, 0x00, 0x00, 0x18, 0x20, 0x00, 0x29, 0x00, 0xb0, 0x68,
            0x30, 0x00, 0x32, 0x00, 0x19, 0x18,
        ),
        raw_pdu!(0x10, 0x33, 0x00, 0xff, 0xff, 0x00, 0x28),
        raw_pdu!(
            0x11, 0x14, 0x90, 0x00, 0x96, 0x00, 0xef, 0xcd, 0xab, 0x89, 0x67, 0x45, 0x23, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x85, 0x60, 0x00, 0x00,
        ),
        raw_pdu!(0x10, 0x97, 0x00, 0xff, 0xff, 0x00, 0x28),
        raw_pdu!(0x01, 0x10, 0x97, 0x00, 0x0a),
    ]),
    define_test!(
        "/TP/GAD/CL/BV-02-C-1",
        RawTransport,
        DiscoverPrimary,
        Some(Uuid::Uuid16(0x1800)),
        [
            raw_pdu!(0x02, 0x00, 0x02),
            raw_pdu!(0x03, 0x00, 0x02),
            raw_pdu!(0x06, 0x01, 0x00, 0xff, 0xff, 0x00, 0x28, 0x00, 0x18),
            raw_pdu!(0x07, 0x01, 0x00, 0x07, 0x00),
            raw_pdu!(0x06, 0x08, 0x00, 0xff, 0xff, 0x00, 0x28, 0x00, 0x18),
            raw_pdu!(0x01, 0x06, 0x08, 0x00, 0x0a),
        ]
    ),
    define_test!(
        "/TP/GAD/CL/BV-02-C-2",
        RawTransport,
        DiscoverPrimary,
        Some(UUID_6085),
        [
            raw_pdu!(0x02, 0x00, 0x02),
            raw_pdu!(0x03, 0x00, 0x02),
            raw_pdu!(
                0x06, 0x01, 0x00, 0xff, 0xff, 0x00, 0x28, 0xef, 0xcd, 0xab, 0x89, 0x67, 0x45,
                0x23, 0x01, 0x00, 0x00, 0x00, 0x00, 0x85, 0x60, 0x00, 0x00,
            ),
            raw_pdu!(0x07, 0x90, 0x00, 0x96, 0x00),
            raw_pdu!(
                0x06, 0x97, 0x00, 0xff, 0xff, 0x00, 0x28, 0xef, 0xcd, 0xab, 0x89, 0x67, 0x45,
                0x23, 0x01, 0x00, 0x00, 0x00, 0x00, 0x85, 0x60, 0x00, 0x00,
            ),
            raw_pdu!(0x01, 0x06, 0x97, 0x00, 0x0a),
        ]
    ),
];
