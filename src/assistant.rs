//! Assistant entry point: one `send_message` per user submission.
//!
//! An exact FAQ match is answered from the static table for any caller.
//! Otherwise each send checks entitlement once: entitled callers get a
//! streaming session and everyone else gets the upsell message.
//! Only one send may be active per assistant (one assistant per
//! conversation); a second send while one is running is rejected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::adapters::ReqwestHttpClient;
use crate::config::AssistConfig;
use crate::error::{AssistError, AssistResult};
use crate::fallback::{FallbackReply, FallbackResponder};
use crate::models::Conversation;
use crate::session::{spawn_session, SessionHandle};
use crate::traits::{EntitlementProvider, HttpClient};
use crate::transport::TransportConnector;

/// What a send produced.
#[derive(Debug)]
pub enum Reply {
    /// Non-streaming reply, already appended to the returned conversation
    Fallback {
        reply: FallbackReply,
        conversation: Conversation,
    },
    /// A running session; join it for the updated conversation
    Streaming(SessionHandle),
}

impl Reply {
    pub fn is_streaming(&self) -> bool {
        matches!(self, Reply::Streaming(_))
    }
}

/// Held for as long as a send is in progress.
#[derive(Debug)]
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Chat assistant for one conversation.
#[derive(Clone)]
pub struct Assistant {
    transport: TransportConnector,
    entitlements: Arc<dyn EntitlementProvider>,
    fallback: FallbackResponder,
    in_flight: Arc<AtomicBool>,
}

impl Assistant {
    pub fn new(
        transport: TransportConnector,
        entitlements: Arc<dyn EntitlementProvider>,
        locale: &str,
    ) -> Self {
        Self {
            transport,
            entitlements,
            fallback: FallbackResponder::new(locale),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Build an assistant backed by reqwest from validated configuration.
    pub fn from_config(
        config: &AssistConfig,
        entitlements: Arc<dyn EntitlementProvider>,
    ) -> AssistResult<Self> {
        config.validate()?;
        let client = ReqwestHttpClient::with_connect_timeout(config.connect_timeout()).map_err(
            |e| AssistError::Configuration {
                message: format!("could not build HTTP client: {}", e),
            },
        )?;
        let client: Arc<dyn HttpClient> = Arc::new(client);
        Ok(Self::new(
            TransportConnector::new(client, config.endpoint.clone()),
            entitlements,
            &config.locale,
        ))
    }

    pub fn locale(&self) -> &'static str {
        self.fallback.locale()
    }

    /// Whether a send is currently in progress.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Send `text` after `history`.
    ///
    /// The caller's conversation is never modified; the updated transcript
    /// comes back in the reply (or in the session report when streaming).
    pub async fn send_message(
        &self,
        history: &Conversation,
        text: &str,
        auth_token: &str,
    ) -> AssistResult<Reply> {
        let guard = InFlightGuard::acquire(&self.in_flight).ok_or_else(|| {
            tracing::debug!("Rejected send: a session is already in flight");
            AssistError::SessionInFlight
        })?;

        // An exact FAQ match is answered locally for every caller
        if let Some(answer) = self.fallback.lookup(text) {
            tracing::info!("Answered from the FAQ table without streaming");
            return Ok(self.local_reply(history, text, FallbackReply::Canned(answer)));
        }

        let can_stream = match self.entitlements.check(auth_token).await {
            Ok(entitlement) => entitlement.can_stream(),
            Err(e) => {
                tracing::warn!("Entitlement check failed, using fallback: {}", e);
                false
            }
        };

        if !can_stream {
            tracing::info!("Caller is not entitled to streaming, sending upsell");
            let upsell = FallbackReply::Upsell(self.fallback.upsell());
            return Ok(self.local_reply(history, text, upsell));
        }

        let handle = spawn_session(
            self.transport.clone(),
            history.clone(),
            text.to_string(),
            auth_token.to_string(),
            guard,
        );
        Ok(Reply::Streaming(handle))
    }

    fn local_reply(&self, history: &Conversation, text: &str, reply: FallbackReply) -> Reply {
        let mut conversation = history.clone();
        conversation.append_user_turn(text);
        conversation.append_assistant_turn(reply.text());
        Reply::Fallback {
            reply,
            conversation,
        }
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("transport", &self.transport)
            .field("locale", &self.fallback.locale())
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockEntitlement, MockHttpClient, MockResponse};
    use crate::models::Role;
    use crate::session::SessionOutcome;
    use crate::traits::{EntitlementError, Tier};

    const URL: &str = "https://api.example.com/chat";

    fn assistant(tier: Tier, response: MockResponse) -> (Assistant, MockHttpClient) {
        let client = MockHttpClient::with_default(response);
        let assistant = Assistant::new(
            TransportConnector::new(Arc::new(client.clone()), URL),
            Arc::new(MockEntitlement::new(tier)),
            "en",
        );
        (assistant, client)
    }

    #[test]
    fn test_guard_is_exclusive() {
        let flag = Arc::new(AtomicBool::new(false));
        let first = InFlightGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(InFlightGuard::acquire(&flag).is_none());
        drop(first);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }

    #[tokio::test]
    async fn test_free_tier_canned_reply_skips_network() {
        let (assistant, client) = assistant(Tier::Free, MockResponse::chunks(["data: [DONE]\n"]));
        let history = Conversation::new();

        let reply = assistant
            .send_message(&history, "How do I log my mood?", "tok")
            .await
            .unwrap();

        match reply {
            Reply::Fallback {
                reply,
                conversation,
            } => {
                assert!(reply.is_canned());
                assert_eq!(conversation.len(), 2);
                assert_eq!(conversation.last().unwrap().content, reply.text());
            }
            Reply::Streaming(_) => panic!("expected fallback"),
        }
        assert_eq!(client.request_count(), 0);
        assert!(history.is_empty());
        assert!(!assistant.is_busy());
    }

    #[tokio::test]
    async fn test_free_tier_no_match_gets_upsell() {
        let (assistant, _) = assistant(Tier::Free, MockResponse::NoBody(200));
        let reply = assistant
            .send_message(&Conversation::new(), "Why am I so tired lately?", "tok")
            .await
            .unwrap();
        assert!(matches!(
            reply,
            Reply::Fallback { reply: FallbackReply::Upsell(_), .. }
        ));
    }

    #[tokio::test]
    async fn test_entitlement_error_treated_as_not_entitled() {
        let client = MockHttpClient::with_default(MockResponse::chunks(["data: [DONE]\n"]));
        let assistant = Assistant::new(
            TransportConnector::new(Arc::new(client.clone()), URL),
            Arc::new(MockEntitlement::failing(EntitlementError::Unavailable(
                "timeout".to_string(),
            ))),
            "en",
        );

        let reply = assistant
            .send_message(&Conversation::new(), "hello", "tok")
            .await
            .unwrap();
        assert!(!reply.is_streaming());
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_premium_streams_and_releases_guard() {
        let (assistant, _) = assistant(
            Tier::Premium,
            MockResponse::chunks([
                "data: {\"choices\":[{\"delta\":{\"content\":\"Rest well\"}}]}\n",
                "data: [DONE]\n",
            ]),
        );

        let reply = assistant
            .send_message(&Conversation::new(), "tips?", "tok")
            .await
            .unwrap();
        let handle = match reply {
            Reply::Streaming(handle) => handle,
            Reply::Fallback { .. } => panic!("expected streaming"),
        };

        let report = handle.join().await.unwrap();
        assert!(matches!(report.outcome, SessionOutcome::Completed));
        assert_eq!(report.reply(), Some("Rest well"));
        assert_eq!(report.conversation.count_role(Role::User), 1);
        assert!(!assistant.is_busy());
    }

    #[tokio::test]
    async fn test_second_send_rejected_while_streaming() {
        let (assistant, client) = assistant(
            Tier::Premium,
            MockResponse::StreamThenHang(vec![bytes::Bytes::from(
                "data: {\"choices\":[{\"delta\":{\"content\":\"Thinking\"}}]}\n",
            )]),
        );

        let mut handle = match assistant
            .send_message(&Conversation::new(), "first", "tok")
            .await
            .unwrap()
        {
            Reply::Streaming(handle) => handle,
            Reply::Fallback { .. } => panic!("expected streaming"),
        };

        // Wait until the session is actually streaming
        assert!(handle.recv().await.is_some());
        assert!(assistant.is_busy());

        let err = assistant
            .send_message(&Conversation::new(), "second", "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, AssistError::SessionInFlight));
        assert_eq!(client.request_count(), 1);

        handle.cancel();
        let report = handle.join().await.unwrap();
        assert!(matches!(report.outcome, SessionOutcome::Cancelled));
        assert_eq!(report.reply(), Some("Thinking"));
        assert!(!assistant.is_busy());
    }

    #[tokio::test]
    async fn test_premium_faq_match_answered_locally() {
        let entitlements = Arc::new(MockEntitlement::new(Tier::Premium));
        let client = MockHttpClient::with_default(MockResponse::chunks(["data: [DONE]\n"]));
        let assistant = Assistant::new(
            TransportConnector::new(Arc::new(client.clone()), URL),
            entitlements.clone(),
            "en",
        );

        let reply = assistant
            .send_message(&Conversation::new(), "How do I log my mood?", "tok")
            .await
            .unwrap();

        assert!(matches!(
            reply,
            Reply::Fallback { reply: FallbackReply::Canned(_), .. }
        ));
        assert_eq!(client.request_count(), 0);
        assert!(entitlements.checked_tokens().is_empty());
        assert!(!assistant.is_busy());
    }

    #[tokio::test]
    async fn test_from_config_rejects_bad_endpoint() {
        let config = AssistConfig::default().with_endpoint("not a url");
        let result = Assistant::from_config(&config, Arc::new(MockEntitlement::default()));
        assert!(matches!(result, Err(AssistError::Configuration { .. })));
    }
}
