use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::core::Error;
use super::message::{Message, HEADER_LEN};

/// OpenFlow framing codec
///
/// Frames are delimited by the 16-bit length in the common header.
#[derive(Clone, Default)]
pub struct OfCodec;

impl OfCodec {
    /// Creates a new OpenFlow codec
    pub fn new() -> Self {
        OfCodec
    }
}

impl Decoder for OfCodec {
    type Item = Message;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < HEADER_LEN {
            // Need more data to read the header
            return Ok(None);
        }

        let length = u16::from_be_bytes([src[2], src[3]]) as usize;
        if length < HEADER_LEN {
            return Err(Error::protocol_decode(format!(
                "frame length {length} shorter than header"
            )));
        }

        if src.len() < length {
            src.reserve(length - src.len());
            return Ok(None);
        }

        let frame = src.split_to(length).freeze();
        Message::decode(frame).map(Some)
    }
}

impl Encoder<Message> for OfCodec {
    type Error = Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.encode(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, Bytes};

    #[test]
    fn test_codec_echo_request() {
        let mut codec = OfCodec::new();
        let mut bytes = BytesMut::new();

        let message = Message::EchoRequest {
            xid: 77,
            data: Bytes::from_static(b"ping"),
        };

        codec.encode(message.clone(), &mut bytes).unwrap();
        assert_eq!(bytes.len(), 12);

        match codec.decode(&mut bytes).unwrap() {
            Some(decoded) => assert_eq!(decoded, message),
            None => panic!("Failed to decode message"),
        }
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_codec_waits_for_full_frame() {
        let mut codec = OfCodec::new();
        let mut full = BytesMut::new();
        codec
            .encode(Message::FeaturesRequest { xid: 1 }, &mut full)
            .unwrap();
        let hello = Message::Hello {
            xid: 2,
            body: Bytes::new(),
        };
        codec.encode(hello, &mut full).unwrap();

        let mut partial = BytesMut::new();
        partial.put_slice(&full[..5]);
        assert!(codec.decode(&mut partial).unwrap().is_none());

        partial.put_slice(&full[5..]);
        assert_eq!(
            codec.decode(&mut partial).unwrap(),
            Some(Message::FeaturesRequest { xid: 1 })
        );
        assert!(matches!(
            codec.decode(&mut partial).unwrap(),
            Some(Message::Hello { xid: 2, .. })
        ));
    }

    #[test]
    fn test_codec_rejects_short_length() {
        let mut codec = OfCodec::new();
        let mut bytes = BytesMut::from(&[4u8, 0, 0, 4, 0, 0, 0, 0][..]);
        assert!(matches!(
            codec.decode(&mut bytes),
            Err(Error::ProtocolDecode(_))
        ));
    }

    #[tokio::test]
    async fn test_framed_read_across_reads() {
        use futures::StreamExt;
        use tokio_util::codec::FramedRead;

        let message = Message::EchoRequest {
            xid: 3,
            data: Bytes::from_static(b"hi"),
        };
        let mut frame = BytesMut::new();
        message.encode(&mut frame).unwrap();

        let mock = tokio_test::io::Builder::new()
            .read(&frame[..3])
            .read(&frame[3..])
            .build();
        let mut reader = FramedRead::new(mock, OfCodec::new());
        assert_eq!(reader.next().await.unwrap().unwrap(), message);
        assert!(reader.next().await.is_none());
    }

    #[tokio::test]
    async fn test_read_failure_is_io_error() {
        use futures::StreamExt;
        use tokio_util::codec::FramedRead;

        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let mock = tokio_test::io::Builder::new().read_error(reset).build();
        let mut reader = FramedRead::new(mock, OfCodec::new());
        assert!(matches!(reader.next().await, Some(Err(Error::Io(_)))));
    }
}
