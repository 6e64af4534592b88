//! Primary service discovery.
//!
//! Without a filter this walks the whole handle space with Read By Group
//! Type. With a filter it uses Find By Type Value, which only returns the
//! handle ranges of services whose UUID matches. Either way the search
//! resumes one past the last end handle and stops at the top of the handle
//! space or on `Attribute Not Found`.

use gatt_proto::{MAX_HANDLE, PRIMARY_SERVICE, Uuid, pdu};

use crate::{Att, AttError};

/// Attribute type of a primary service declaration, as Find By Type Value
/// takes it.
const PRIMARY_SERVICE_TYPE: u16 = 0x2800;

/// A discovered primary service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryService {
    pub start: u16,
    pub end: u16,
    pub uuid: Uuid,
}

pub async fn discover_primary_services(
    att: &Att,
    filter: Option<Uuid>,
) -> Result<Vec<PrimaryService>, AttError> {
    match filter {
        None => discover_all(att).await,
        Some(uuid) => discover_by_uuid(att, uuid).await,
    }
}

async fn discover_all(att: &Att) -> Result<Vec<PrimaryService>, AttError> {
    let mut services = Vec::new();
    let mut start = 0x0001;

    loop {
        let req = pdu::read_by_group_type_req(start, MAX_HANDLE, PRIMARY_SERVICE);
        let rsp = match att.request(req).await {
            Ok(rsp) => rsp,
            Err(e) if e.is_attribute_not_found() => break,
            Err(e) => return Err(e),
        };

        let mut last_end = start;
        for entry in pdu::parse_read_by_group_type_rsp(&rsp)? {
            check_range(start, entry.start, entry.end)?;
            services.push(PrimaryService {
                start: entry.start,
                end: entry.end,
                uuid: entry.uuid,
            });
            last_end = entry.end;
        }

        tracing::trace!(start, last_end, found = services.len(), "group type page");
        if last_end == MAX_HANDLE {
            break;
        }
        start = last_end + 1;
    }

    Ok(services)
}

async fn discover_by_uuid(att: &Att, uuid: Uuid) -> Result<Vec<PrimaryService>, AttError> {
    let mut value = Vec::with_capacity(uuid.wire_len());
    uuid.write_le(&mut value);

    let mut services = Vec::new();
    let mut start = 0x0001;

    loop {
        let req = pdu::find_by_type_value_req(start, MAX_HANDLE, PRIMARY_SERVICE_TYPE, &value);
        let rsp = match att.request(req).await {
            Ok(rsp) => rsp,
            Err(e) if e.is_attribute_not_found() => break,
            Err(e) => return Err(e),
        };

        let mut last_end = start;
        for range in pdu::parse_find_by_type_value_rsp(&rsp)? {
            check_range(start, range.start, range.end)?;
            services.push(PrimaryService {
                start: range.start,
                end: range.end,
                uuid,
            });
            last_end = range.end;
        }

        tracing::trace!(start, last_end, found = services.len(), "type value page");
        if last_end == MAX_HANDLE {
            break;
        }
        start = last_end + 1;
    }

    Ok(services)
}

/// Each range must sit at or after the requested start and be non-empty,
/// otherwise the next page would not make progress.
fn check_range(search_start: u16, start: u16, end: u16) -> Result<(), AttError> {
    if start < search_start {
        return Err(AttError::InvalidResponse("service starts before search range"));
    }
    if end < start {
        return Err(AttError::InvalidResponse("service end precedes its start"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatt_proto::ErrorCode;
    use gatt_transport::{Transport, TransportKind};

    async fn expect(transport: &Transport, want: &[u8]) {
        let mut buf = [0u8; 64];
        let n = transport.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], want);
    }

    #[tokio_test_lite::test]
    async fn pages_until_attribute_not_found() {
        let (a, b) = Transport::pair(TransportKind::Mem).unwrap();
        let att = Att::new(a, 512);
        let search = {
            let att = att.clone();
            tokio::spawn(async move { discover_primary_services(&att, None).await })
        };

        expect(&b, &[0x10, 0x01, 0x00, 0xff, 0xff, 0x00, 0x28]).await;
        b.send(&[0x11, 0x06, 0x01, 0x00, 0x05, 0x00, 0x00, 0x18])
            .await
            .unwrap();
        expect(&b, &[0x10, 0x06, 0x00, 0xff, 0xff, 0x00, 0x28]).await;
        b.send(&[0x01, 0x10, 0x06, 0x00, 0x0a]).await.unwrap();

        let services = search.await.unwrap().unwrap();
        assert_eq!(
            services,
            vec![PrimaryService {
                start: 0x0001,
                end: 0x0005,
                uuid: Uuid::Uuid16(0x1800)
            }]
        );
    }

    #[tokio_test_lite::test]
    async fn stops_at_top_of_handle_space() {
        let (a, b) = Transport::pair(TransportKind::Mem).unwrap();
        let att = Att::new(a, 512);
        let search = {
            let att = att.clone();
            tokio::spawn(async move {
                discover_primary_services(&att, Some(Uuid::Uuid16(0x180f))).await
            })
        };

        expect(&b, &[0x06, 0x01, 0x00, 0xff, 0xff, 0x00, 0x28, 0x0f, 0x18]).await;
        b.send(&[0x07, 0x10, 0x00, 0xff, 0xff]).await.unwrap();

        let services = search.await.unwrap().unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].end, MAX_HANDLE);
        assert_eq!(services[0].uuid, Uuid::Uuid16(0x180f));
    }

    #[tokio_test_lite::test]
    async fn other_errors_fail_the_search() {
        let (a, b) = Transport::pair(TransportKind::Mem).unwrap();
        let att = Att::new(a, 512);
        let search = {
            let att = att.clone();
            tokio::spawn(async move { discover_primary_services(&att, None).await })
        };

        expect(&b, &[0x10, 0x01, 0x00, 0xff, 0xff, 0x00, 0x28]).await;
        b.send(&[0x01, 0x10, 0x01, 0x00, 0x10]).await.unwrap();

        let err = search.await.unwrap().unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::UnsupportedGroupType));
    }

    #[test]
    fn range_checks() {
        assert!(check_range(0x10, 0x10, 0x10).is_ok());
        assert!(check_range(0x10, 0x0f, 0x20).is_err());
        assert!(check_range(0x10, 0x20, 0x1f).is_err());
    }
}
