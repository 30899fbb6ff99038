//! # Transport Integration
//!
//! A gateway-shaped client speaks the length-prefixed TCP protocol to the
//! fully wired service: transport → intake queue → handler → CS-01 → CS-02 → reply.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::watch;
    use tokio::time::timeout;

    use certificate_runtime::adapters::{encode_frame, FrameDecoder, TcpTransport};
    use certificate_runtime::VoteConfirmedHandler;
    use shared_bus::{intake_channel, InMemoryEventBus, DEFAULT_INTAKE_CAPACITY};

    use crate::fixtures::{
        ana, intake_service, issuance_service, seal_payload, RecordingMailer, INTERNAL_API_KEY,
    };

    struct Harness {
        addr: SocketAddr,
        mailer: RecordingMailer,
        _shutdown: watch::Sender<bool>,
    }

    async fn start_service() -> Harness {
        let (sender, receiver) = intake_channel(DEFAULT_INTAKE_CAPACITY);
        let mailer = RecordingMailer::new();

        let handler = Arc::new(VoteConfirmedHandler::new(
            Arc::new(intake_service()),
            Arc::new(issuance_service(mailer.clone())),
        ));
        tokio::spawn(handler.run(receiver, Arc::new(InMemoryEventBus::new())));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let transport = Arc::new(TcpTransport::new(sender).with_reply_timeout(Duration::from_secs(10)));
        tokio::spawn(transport.serve(listener, shutdown_rx));

        Harness {
            addr,
            mailer,
            _shutdown: shutdown_tx,
        }
    }

    fn vote_confirmed(id: &str, api_key: &str, envelope: &str) -> String {
        let packet = json!({
            "pattern": "vote.confirmed",
            "data": {
                "headers": {
                    "x-api-key": api_key,
                    "x-security-envelope": envelope,
                }
            },
            "id": id,
        });
        encode_frame(&packet.to_string())
    }

    async fn read_replies(stream: &mut TcpStream, count: usize) -> Vec<Value> {
        let mut decoder = FrameDecoder::new();
        let mut replies = Vec::new();
        let mut buf = [0u8; 4096];

        while replies.len() < count {
            while let Some(frame) = decoder.next_frame().unwrap() {
                replies.push(serde_json::from_str(&frame).unwrap());
            }
            if replies.len() >= count {
                break;
            }
            let n = timeout(Duration::from_secs(15), stream.read(&mut buf))
                .await
                .expect("reply within timeout")
                .unwrap();
            assert!(n > 0, "service closed the connection");
            decoder.extend(&buf[..n]);
        }
        replies
    }

    #[tokio::test]
    async fn test_request_reply_over_tcp() {
        let harness = start_service().await;
        let mut stream = TcpStream::connect(harness.addr).await.unwrap();

        let frame = vote_confirmed("req-1", INTERNAL_API_KEY, &seal_payload(&ana()));
        stream.write_all(frame.as_bytes()).await.unwrap();

        let replies = read_replies(&mut stream, 1).await;
        assert_eq!(replies[0]["id"], "req-1");
        assert_eq!(replies[0]["isDisposed"], true);
        assert_eq!(replies[0]["response"]["success"], true);
        assert_eq!(
            replies[0]["response"]["message"],
            "Certificado generado y enviado correctamente"
        );
        assert_eq!(harness.mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_pipelined_requests_each_get_their_reply() {
        let harness = start_service().await;
        let mut stream = TcpStream::connect(harness.addr).await.unwrap();

        let good = vote_confirmed("good", INTERNAL_API_KEY, &seal_payload(&ana()));
        let bad = vote_confirmed("bad", "wrong-key", "a.b.c.d.e");
        stream
            .write_all(format!("{good}{bad}").as_bytes())
            .await
            .unwrap();

        let replies = read_replies(&mut stream, 2).await;
        let by_id = |id: &str| {
            replies
                .iter()
                .find(|r| r["id"] == id)
                .cloned()
                .unwrap_or_else(|| panic!("no reply for {id}"))
        };

        assert_eq!(by_id("good")["response"]["success"], true);
        assert_eq!(by_id("bad")["response"]["success"], false);
        assert_eq!(
            by_id("bad")["response"]["message"],
            "Acceso denegado: API Key inválida"
        );
        assert_eq!(harness.mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_tampered_envelope_gets_opaque_reply() {
        let harness = start_service().await;
        let mut stream = TcpStream::connect(harness.addr).await.unwrap();

        let mut envelope = seal_payload(&ana());
        envelope.push('A');
        let frame = vote_confirmed("t", INTERNAL_API_KEY, &envelope);
        stream.write_all(frame.as_bytes()).await.unwrap();

        let replies = read_replies(&mut stream, 1).await;
        assert_eq!(replies[0]["response"]["success"], false);
        assert_eq!(
            replies[0]["response"]["message"],
            "Sobre de seguridad inválido, corrupto o sistema de llaves comprometido"
        );
        assert!(harness.mailer.sent().is_empty());
    }
}
