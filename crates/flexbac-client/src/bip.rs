use crate::catalog::RegisterDescriptor;
use crate::error::{DeviceError, TransportError};
use crate::identity::{DeviceIdentity, IDENTITY_PROPERTIES};
use crate::raw::{RawBatch, RawReading};
use crate::session::{Session, SessionLifecycle, Transport};
use flexbac_core::apdu::{
    AbortPdu, ApduType, BacnetError, ComplexAckHeader, RejectPdu, SimpleAck,
};
use flexbac_core::encoding::{reader::Reader, writer::Writer};
use flexbac_core::npdu::Npdu;
use flexbac_core::services::read_property_multiple::{
    PropertyReference, ReadAccessSpecification, ReadPropertyMultipleAck,
    ReadPropertyMultipleRequest, SERVICE_READ_PROPERTY_MULTIPLE,
};
use flexbac_core::services::write_property::{WritePropertyRequest, SERVICE_WRITE_PROPERTY};
use flexbac_core::types::{DataValue, PropertyId};
use flexbac_datalink::{local_ip_for, BacnetIpTransport, DataLink, DataLinkError};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::{timeout, Instant};

pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens BACnet/IP sessions, each on its own UDP socket.
#[derive(Debug, Clone)]
pub struct BipTransport {
    local_port: u16,
    response_timeout: Duration,
}

impl Default for BipTransport {
    fn default() -> Self {
        Self {
            local_port: 0,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }
}

impl BipTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds sessions to a fixed local port instead of an ephemeral one.
    /// Concurrent sessions then contend for it.
    pub fn with_local_port(mut self, port: u16) -> Self {
        self.local_port = port;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }
}

impl Transport for BipTransport {
    type Session = BipSession<BacnetIpTransport>;

    async fn open(&self, peer: SocketAddr) -> Result<Self::Session, DeviceError> {
        let local_ip = local_ip_for(peer)
            .await
            .map_err(|source| DeviceError::NoRoute { peer, source })?;
        let datalink = BacnetIpTransport::bind(SocketAddr::new(local_ip, self.local_port))
            .await
            .map_err(DeviceError::BindFailed)?;
        log::debug!(
            "opened session {} -> {peer}",
            datalink
                .local_addr()
                .map_or_else(|_| local_ip.to_string(), |a| a.to_string())
        );
        Ok(BipSession::bound(datalink, peer, self.response_timeout))
    }
}

enum Reply {
    Simple,
    Complex(Vec<u8>),
}

/// A bound BACnet/IP session over any [`DataLink`].
#[derive(Debug)]
pub struct BipSession<D> {
    datalink: Option<D>,
    peer: SocketAddr,
    invoke_id: u8,
    response_timeout: Duration,
    lifecycle: SessionLifecycle,
}

impl<D: DataLink> BipSession<D> {
    /// Wraps an already bound data link.
    pub fn bound(datalink: D, peer: SocketAddr, response_timeout: Duration) -> Self {
        let mut lifecycle = SessionLifecycle::default();
        lifecycle.begin_bind();
        lifecycle.bound();
        Self {
            datalink: Some(datalink),
            peer,
            invoke_id: 1,
            response_timeout,
            lifecycle,
        }
    }

    pub fn lifecycle(&self) -> &SessionLifecycle {
        &self.lifecycle
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    fn next_invoke_id(&mut self) -> u8 {
        let id = self.invoke_id;
        self.invoke_id = self.invoke_id.wrapping_add(1).max(1);
        id
    }

    fn datalink(&self) -> Result<&D, TransportError> {
        self.datalink.as_ref().ok_or(TransportError::UnsupportedResponse)
    }

    async fn recv_skipping_stray_frames(
        &self,
        buf: &mut [u8],
        deadline: Instant,
    ) -> Result<(usize, SocketAddr), TransportError> {
        let datalink = self.datalink()?;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(TransportError::Timeout);
            }

            match timeout(remaining, datalink.recv(buf)).await {
                Err(_) => return Err(TransportError::Timeout),
                Ok(Err(e @ DataLinkError::Io(_))) => return Err(e.into()),
                // Undecodable datagrams carry no trustworthy sender, so they
                // cannot be pinned on the peer.
                Ok(Err(
                    e @ (DataLinkError::InvalidFrame
                    | DataLinkError::UnsupportedBvlcFunction(_)
                    | DataLinkError::BvlcResult(_)
                    | DataLinkError::FrameTooLarge),
                )) => {
                    log::debug!("skipping datagram: {e}");
                }
                Ok(Ok(v)) => return Ok(v),
            }
        }
    }

    /// Sends one confirmed request and waits for the matching answer.
    /// Frames from other peers or for other invoke ids are skipped.
    async fn exchange(
        &self,
        tx: &[u8],
        invoke_id: u8,
        service_choice: u8,
    ) -> Result<Reply, TransportError> {
        let deadline = Instant::now() + self.response_timeout;
        self.datalink()?.send(self.peer, tx).await?;

        loop {
            let mut rx = [0u8; 1500];
            let (n, src) = self.recv_skipping_stray_frames(&mut rx, deadline).await?;
            if src != self.peer {
                log::debug!("ignoring frame from {src}");
                continue;
            }
            let Some(apdu) = extract_apdu(&rx[..n])? else {
                continue;
            };
            let mut r = Reader::new(apdu);
            match ApduType::of(apdu) {
                Some(ApduType::SimpleAck) => {
                    let ack = SimpleAck::decode(&mut r)?;
                    if ack.invoke_id == invoke_id && ack.service_choice == service_choice {
                        return Ok(Reply::Simple);
                    }
                }
                Some(ApduType::ComplexAck) => {
                    let ack = ComplexAckHeader::decode(&mut r)?;
                    if ack.invoke_id != invoke_id || ack.service_choice != service_choice {
                        continue;
                    }
                    if ack.segmented {
                        return Err(TransportError::UnsupportedResponse);
                    }
                    return Ok(Reply::Complex(r.rest().to_vec()));
                }
                Some(ApduType::Error) => {
                    let err = BacnetError::decode(&mut r)?;
                    if err.invoke_id == invoke_id && err.service_choice == service_choice {
                        return Err(remote_service_error(err));
                    }
                }
                Some(ApduType::Reject) => {
                    let rej = RejectPdu::decode(&mut r)?;
                    if rej.invoke_id == invoke_id {
                        return Err(TransportError::RemoteReject { reason: rej.reason });
                    }
                }
                Some(ApduType::Abort) => {
                    let abort = AbortPdu::decode(&mut r)?;
                    if abort.invoke_id == invoke_id {
                        return Err(TransportError::RemoteAbort {
                            reason: abort.reason,
                            server: abort.server,
                        });
                    }
                }
                _ => continue,
            }
        }
    }

    async fn read_multiple(
        &mut self,
        specs: &[ReadAccessSpecification],
    ) -> Result<ReadPropertyMultipleAck, TransportError> {
        let invoke_id = self.next_invoke_id();
        let mut w = Writer::new();
        Npdu::request().encode(&mut w);
        ReadPropertyMultipleRequest { specs, invoke_id }.encode(&mut w);

        match self
            .exchange(w.as_written(), invoke_id, SERVICE_READ_PROPERTY_MULTIPLE)
            .await?
        {
            Reply::Complex(payload) => {
                let mut r = Reader::new(&payload);
                Ok(ReadPropertyMultipleAck::decode_after_header(&mut r)?)
            }
            Reply::Simple => Err(TransportError::UnsupportedResponse),
        }
    }

    async fn write_present_value(
        &mut self,
        register: &RegisterDescriptor,
        value: DataValue,
    ) -> Result<(), TransportError> {
        let invoke_id = self.next_invoke_id();
        let request = WritePropertyRequest {
            object_id: register.object_id,
            property_id: PropertyId::PresentValue,
            value,
            array_index: None,
            priority: register.priority,
            invoke_id,
        };
        let mut w = Writer::new();
        Npdu::request().encode(&mut w);
        request.encode(&mut w)?;

        match self
            .exchange(w.as_written(), invoke_id, SERVICE_WRITE_PROPERTY)
            .await?
        {
            Reply::Simple => Ok(()),
            Reply::Complex(_) => Err(TransportError::UnsupportedResponse),
        }
    }
}

impl<D: DataLink> Session for BipSession<D> {
    async fn read_batch(
        &mut self,
        registers: &[RegisterDescriptor],
    ) -> Result<RawBatch, DeviceError> {
        self.lifecycle.begin_operation()?;
        let specs = read_access_specs(registers);
        if specs.is_empty() {
            return Ok(RawBatch::new());
        }
        let ack = self
            .read_multiple(&specs)
            .await
            .map_err(DeviceError::from_read)?;
        RawBatch::from_ack(registers, ack).map_err(DeviceError::from_read)
    }

    async fn read_identity(&mut self, device_id: u32) -> Result<DeviceIdentity, DeviceError> {
        self.lifecycle.begin_operation()?;
        let object_id = DeviceIdentity::device_object(device_id);
        let specs = [ReadAccessSpecification {
            object_id,
            properties: IDENTITY_PROPERTIES
                .iter()
                .copied()
                .map(PropertyReference::new)
                .collect(),
        }];
        let ack = self
            .read_multiple(&specs)
            .await
            .map_err(DeviceError::from_read)?;

        let mut reading = RawReading::new();
        for element in ack
            .results
            .into_iter()
            .filter(|r| r.object_id == object_id)
            .flat_map(|r| r.results)
        {
            if let Ok(value) = element.value {
                reading.insert(element.property_id, value);
            }
        }
        DeviceIdentity::from_reading(device_id, &reading).map_err(DeviceError::Protocol)
    }

    async fn write_one(
        &mut self,
        register: &RegisterDescriptor,
        value: DataValue,
    ) -> Result<(), DeviceError> {
        self.lifecycle.begin_operation()?;
        log::debug!(
            "write {} ({}) = {value:?} priority {:?}",
            register.name,
            register.object_id,
            register.priority
        );
        self.write_present_value(register, value)
            .await
            .map_err(|source| DeviceError::WriteFailed {
                register: register.name.to_owned(),
                source,
            })
    }

    async fn close(&mut self) {
        if !self.lifecycle.begin_unbind() {
            return;
        }
        // Dropping the data link releases its socket.
        if self.datalink.take().is_some() {
            log::debug!("closed session to {}", self.peer);
        }
        self.lifecycle.unbound();
    }
}

impl<D> Drop for BipSession<D> {
    fn drop(&mut self) {
        if self.datalink.is_some() {
            log::debug!("session to {} released on drop", self.peer);
        }
    }
}

/// One access specification per register, in catalog order.
pub fn read_access_specs(registers: &[RegisterDescriptor]) -> Vec<ReadAccessSpecification> {
    registers
        .iter()
        .map(|register| ReadAccessSpecification {
            object_id: register.object_id,
            properties: register
                .read_selectors
                .iter()
                .copied()
                .map(PropertyReference::new)
                .collect(),
        })
        .collect()
}

/// Strips the NPDU header. Network-layer messages yield `None`.
fn extract_apdu(payload: &[u8]) -> Result<Option<&[u8]>, TransportError> {
    let mut r = Reader::new(payload);
    let npdu = Npdu::decode(&mut r)?;
    if npdu.message_type.is_some() {
        return Ok(None);
    }
    Ok(Some(r.rest()))
}

fn remote_service_error(err: BacnetError) -> TransportError {
    TransportError::RemoteServiceError {
        service_choice: err.service_choice,
        error_class: err.error_class,
        error_code: err.error_code,
    }
}

#[cfg(test)]
mod tests {
    use super::{read_access_specs, BipSession};
    use crate::catalog::{Decoder, RegisterDescriptor};
    use crate::error::{DeviceError, TransportError};
    use crate::session::{Session, SessionState};
    use crate::value::TypedValue;
    use flexbac_core::apdu::{BacnetError, ComplexAckHeader, SimpleAck};
    use flexbac_core::encoding::{
        primitives::{encode_ctx_object_id, encode_ctx_unsigned},
        reader::Reader,
        tag::Tag,
        writer::Writer,
    };
    use flexbac_core::npdu::Npdu;
    use flexbac_core::services::read_property_multiple::SERVICE_READ_PROPERTY_MULTIPLE;
    use flexbac_core::services::value_codec::encode_application_data_value;
    use flexbac_core::services::write_property::SERVICE_WRITE_PROPERTY;
    use flexbac_core::types::{DataValue, ObjectId, ObjectType, PropertyId};
    use flexbac_datalink::{DataLink, DataLinkError};
    use std::collections::VecDeque;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    const PEER: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50)), 47808);

    const OUTSIDE: RegisterDescriptor = RegisterDescriptor::new(
        "outside_air_temperature",
        ObjectType::AnalogInput,
        1,
        Decoder::Real { decimals: 1 },
    );
    const MODE: RegisterDescriptor = RegisterDescriptor::new(
        "ventilation_mode",
        ObjectType::MultiStateValue,
        42,
        Decoder::MultiState,
    )
    .with_priority(13);

    #[derive(Debug, Default)]
    struct MockState {
        sent: Mutex<Vec<(SocketAddr, Vec<u8>)>>,
        /// Receive errors, returned before any queued frame.
        failures: Mutex<VecDeque<DataLinkError>>,
        recv: Mutex<VecDeque<(Vec<u8>, SocketAddr)>>,
    }

    #[derive(Debug, Clone)]
    struct MockDataLink {
        state: Arc<MockState>,
    }

    impl MockDataLink {
        fn new() -> (Self, Arc<MockState>) {
            let state = Arc::new(MockState::default());
            (
                Self {
                    state: state.clone(),
                },
                state,
            )
        }
    }

    impl DataLink for MockDataLink {
        async fn send(&self, address: SocketAddr, payload: &[u8]) -> Result<(), DataLinkError> {
            self.state
                .sent
                .lock()
                .await
                .push((address, payload.to_vec()));
            Ok(())
        }

        async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), DataLinkError> {
            if let Some(err) = self.state.failures.lock().await.pop_front() {
                return Err(err);
            }
            let next = self.state.recv.lock().await.pop_front();
            let Some((payload, addr)) = next else {
                return std::future::pending().await;
            };
            buf[..payload.len()].copy_from_slice(&payload);
            Ok((payload.len(), addr))
        }
    }

    fn session() -> (BipSession<MockDataLink>, Arc<MockState>) {
        let (dl, state) = MockDataLink::new();
        (
            BipSession::bound(dl, PEER, Duration::from_millis(200)),
            state,
        )
    }

    fn with_npdu(apdu: &[u8]) -> Vec<u8> {
        let mut w = Writer::new();
        Npdu::default().encode(&mut w);
        w.write_all(apdu);
        w.into_bytes()
    }

    fn rpm_ack(invoke_id: u8, objects: &[(ObjectId, Vec<(PropertyId, DataValue)>)]) -> Vec<u8> {
        let mut w = Writer::new();
        ComplexAckHeader {
            segmented: false,
            invoke_id,
            service_choice: SERVICE_READ_PROPERTY_MULTIPLE,
        }
        .encode(&mut w);
        for (object_id, props) in objects {
            encode_ctx_object_id(&mut w, 0, object_id.raw());
            Tag::Opening { tag_num: 1 }.encode(&mut w);
            for (property, value) in props {
                encode_ctx_unsigned(&mut w, 2, property.to_u32());
                Tag::Opening { tag_num: 4 }.encode(&mut w);
                encode_application_data_value(&mut w, value).unwrap();
                Tag::Closing { tag_num: 4 }.encode(&mut w);
            }
            Tag::Closing { tag_num: 1 }.encode(&mut w);
        }
        with_npdu(w.as_written())
    }

    fn simple_ack(invoke_id: u8, service_choice: u8) -> Vec<u8> {
        let mut w = Writer::new();
        SimpleAck {
            invoke_id,
            service_choice,
        }
        .encode(&mut w);
        with_npdu(w.as_written())
    }

    #[test]
    fn specs_follow_catalog_order() {
        let specs = read_access_specs(&[MODE, OUTSIDE]);
        assert_eq!(specs[0].object_id, MODE.object_id);
        assert_eq!(specs[0].properties.len(), 2);
        assert_eq!(specs[1].object_id, OUTSIDE.object_id);
    }

    #[tokio::test]
    async fn read_batch_sends_one_request_and_maps_reply() {
        let (mut session, state) = session();
        state.recv.lock().await.push_back((
            rpm_ack(
                1,
                &[
                    (
                        OUTSIDE.object_id,
                        vec![(PropertyId::PresentValue, DataValue::Real(12.5))],
                    ),
                    (
                        MODE.object_id,
                        vec![
                            (PropertyId::PresentValue, DataValue::Unsigned(3)),
                            (
                                PropertyId::StateText,
                                DataValue::List(vec![
                                    DataValue::CharacterString("Stop".into()),
                                    DataValue::CharacterString("Away".into()),
                                    DataValue::CharacterString("Home".into()),
                                ]),
                            ),
                        ],
                    ),
                ],
            ),
            PEER,
        ));

        let batch = session.read_batch(&[OUTSIDE, MODE]).await.unwrap();
        let mode = MODE.decode(batch.get("ventilation_mode").unwrap()).unwrap();
        assert_eq!(
            mode,
            TypedValue::Enum {
                index: 3,
                label: Some("Home".into())
            }
        );

        let sent = state.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, PEER);
        assert_eq!(&sent[0].1[..2], &[0x01, 0x04]);
        assert_eq!(sent[0].1[5], SERVICE_READ_PROPERTY_MULTIPLE);
    }

    #[tokio::test]
    async fn frames_from_other_peers_and_invokes_are_skipped() {
        let (mut session, state) = session();
        let stranger = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9)), 47808);
        let reply = |invoke| {
            rpm_ack(
                invoke,
                &[(
                    OUTSIDE.object_id,
                    vec![(PropertyId::PresentValue, DataValue::Real(1.0))],
                )],
            )
        };
        {
            let mut q = state.recv.lock().await;
            q.push_back((reply(1), stranger));
            q.push_back((reply(9), PEER));
            q.push_back((reply(1), PEER));
        }
        let batch = session.read_batch(&[OUTSIDE]).await.unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[tokio::test]
    async fn stray_bvlc_traffic_does_not_end_the_exchange() {
        let (mut session, state) = session();
        state.failures.lock().await.extend([
            DataLinkError::UnsupportedBvlcFunction(0x0B),
            DataLinkError::BvlcResult(0x0030),
            DataLinkError::InvalidFrame,
        ]);
        state.recv.lock().await.push_back((
            rpm_ack(
                1,
                &[(
                    OUTSIDE.object_id,
                    vec![(PropertyId::PresentValue, DataValue::Real(4.0))],
                )],
            ),
            PEER,
        ));
        let batch = session.read_batch(&[OUTSIDE]).await.unwrap();
        assert_eq!(
            batch.get(OUTSIDE.name).unwrap().present(),
            Some(&DataValue::Real(4.0))
        );
    }

    #[tokio::test]
    async fn socket_errors_end_the_exchange() {
        let (mut session, state) = session();
        state
            .failures
            .lock()
            .await
            .push_back(DataLinkError::Io(std::io::ErrorKind::ConnectionRefused.into()));
        assert!(matches!(
            session.read_batch(&[OUTSIDE]).await,
            Err(DeviceError::Protocol(TransportError::DataLink(DataLinkError::Io(_))))
        ));
    }

    #[tokio::test]
    async fn state_text_in_unknown_charset_is_dropped() {
        let (mut session, state) = session();
        let mut w = Writer::new();
        ComplexAckHeader {
            segmented: false,
            invoke_id: 1,
            service_choice: SERVICE_READ_PROPERTY_MULTIPLE,
        }
        .encode(&mut w);
        encode_ctx_object_id(&mut w, 0, MODE.object_id.raw());
        Tag::Opening { tag_num: 1 }.encode(&mut w);
        encode_ctx_unsigned(&mut w, 2, PropertyId::PresentValue.to_u32());
        Tag::Opening { tag_num: 4 }.encode(&mut w);
        encode_application_data_value(&mut w, &DataValue::Unsigned(3)).unwrap();
        Tag::Closing { tag_num: 4 }.encode(&mut w);
        encode_ctx_unsigned(&mut w, 2, PropertyId::StateText.to_u32());
        Tag::Opening { tag_num: 4 }.encode(&mut w);
        // "Hjem" in IBM/Microsoft DBCS
        w.write_all(&[0x75, 0x01, b'H', b'j', b'e', b'm']);
        Tag::Closing { tag_num: 4 }.encode(&mut w);
        Tag::Closing { tag_num: 1 }.encode(&mut w);
        state
            .recv
            .lock()
            .await
            .push_back((with_npdu(w.as_written()), PEER));

        let batch = session.read_batch(&[MODE]).await.unwrap();
        assert_eq!(
            MODE.decode(batch.get(MODE.name).unwrap()).unwrap(),
            TypedValue::Enum {
                index: 3,
                label: None
            }
        );
    }

    #[tokio::test]
    async fn silent_peer_times_out() {
        let (mut session, _state) = session();
        let err = session.read_batch(&[OUTSIDE]).await.unwrap_err();
        assert!(matches!(err, DeviceError::Timeout));
    }

    #[tokio::test]
    async fn empty_ack_is_a_protocol_error() {
        let (mut session, state) = session();
        state.recv.lock().await.push_back((rpm_ack(1, &[]), PEER));
        let err = session.read_batch(&[OUTSIDE]).await.unwrap_err();
        assert!(matches!(
            err,
            DeviceError::Protocol(TransportError::EmptyReply)
        ));
    }

    #[tokio::test]
    async fn write_carries_register_priority() {
        let (mut session, state) = session();
        state
            .recv
            .lock()
            .await
            .push_back((simple_ack(1, SERVICE_WRITE_PROPERTY), PEER));
        session
            .write_one(&MODE, DataValue::Unsigned(2))
            .await
            .unwrap();

        let sent = state.sent.lock().await;
        let frame = &sent[0].1;
        assert_eq!(&frame[frame.len() - 2..], &[0x49, 13]);
    }

    #[tokio::test]
    async fn write_without_priority_omits_tag() {
        let (mut session, state) = session();
        state
            .recv
            .lock()
            .await
            .push_back((simple_ack(1, SERVICE_WRITE_PROPERTY), PEER));
        session
            .write_one(&OUTSIDE, DataValue::Real(55.0))
            .await
            .unwrap();

        let sent = state.sent.lock().await;
        assert_eq!(sent[0].1.last(), Some(&0x3F));
    }

    #[tokio::test]
    async fn remote_error_fails_the_write() {
        let (mut session, state) = session();
        let mut w = Writer::new();
        BacnetError {
            invoke_id: 1,
            service_choice: SERVICE_WRITE_PROPERTY,
            error_class: Some(2),
            error_code: Some(40),
        }
        .encode(&mut w);
        state
            .recv
            .lock()
            .await
            .push_back((with_npdu(w.as_written()), PEER));

        let err = session
            .write_one(&MODE, DataValue::Unsigned(2))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeviceError::WriteFailed {
                source: TransportError::RemoteServiceError {
                    error_code: Some(40),
                    ..
                },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn reject_fails_the_write() {
        let (mut session, state) = session();
        state
            .recv
            .lock()
            .await
            .push_back((with_npdu(&[0x60, 1, 9]), PEER));
        let err = session
            .write_one(&MODE, DataValue::Unsigned(2))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeviceError::WriteFailed {
                source: TransportError::RemoteReject { reason: 9 },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn identity_tolerates_missing_optionals() {
        let (mut session, state) = session();
        let device = ObjectId::new(ObjectType::Device, 2);
        state.recv.lock().await.push_back((
            rpm_ack(
                1,
                &[(
                    device,
                    vec![(
                        PropertyId::ObjectName,
                        DataValue::CharacterString("Nordic S3".into()),
                    )],
                )],
            ),
            PEER,
        ));
        let id = session.read_identity(2).await.unwrap();
        assert_eq!(id.object_name, "Nordic S3");
        assert_eq!(id.unique_id(), "device-2");

        let sent = state.sent.lock().await;
        let mut r = Reader::new(&sent[0].1);
        Npdu::decode(&mut r).unwrap();
        assert_eq!(r.rest()[3], SERVICE_READ_PROPERTY_MULTIPLE);
    }

    #[tokio::test]
    async fn one_operation_then_close_twice() {
        let (mut session, state) = session();
        state
            .recv
            .lock()
            .await
            .push_back((simple_ack(1, SERVICE_WRITE_PROPERTY), PEER));
        session
            .write_one(&OUTSIDE, DataValue::Real(1.0))
            .await
            .unwrap();
        assert!(matches!(
            session.read_batch(&[OUTSIDE]).await,
            Err(DeviceError::SessionClosed)
        ));

        session.close().await;
        session.close().await;
        assert_eq!(session.lifecycle().state(), SessionState::Unbound);
        assert!(matches!(
            session.write_one(&OUTSIDE, DataValue::Real(1.0)).await,
            Err(DeviceError::SessionClosed)
        ));
    }
}
