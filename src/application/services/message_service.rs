use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::messaging::{Dispatch, MessageDispatcher};
use crate::domain::entities::{InboundMessage, OutboundMessage};
use crate::domain::traits::Platform;

/// Service for moving messages between the platform and the dispatcher
pub struct MessageService {
    dispatcher: Arc<MessageDispatcher>,
}

impl MessageService {
    pub fn new(dispatcher: Arc<MessageDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Dispatch inbound messages one at a time until the source closes.
    ///
    /// A failing message is logged and skipped; the loop keeps going.
    pub async fn run_inbound(&self, mut inbound: mpsc::UnboundedReceiver<InboundMessage>) -> usize {
        let mut handled = 0;
        while let Some(message) = inbound.recv().await {
            let channel = message.channel.clone();
            match self.dispatcher.dispatch(message).await {
                Ok(Dispatch::NoMatch) => {}
                Ok(result) => {
                    tracing::debug!("[{}] {:?}", channel, result);
                    handled += 1;
                }
                Err(e) => tracing::error!("[{}] Failed to handle message: {}", channel, e),
            }
        }
        handled
    }

    /// Deliver queued responses until every sender is dropped.
    ///
    /// The handlers own the senders, so this only returns once the
    /// dispatcher holding them is gone.
    pub async fn run_outbound(
        platform: Arc<dyn Platform>,
        mut outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    ) -> usize {
        let mut delivered = 0;
        while let Some(message) = outbound.recv().await {
            tracing::info!(
                "Sending response to {}: {}",
                message.channel,
                message.text.chars().take(100).collect::<String>()
            );
            match platform.send_message(&message.channel, &message.text).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::error!("Failed to send message: {}", e),
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::BotError;
    use crate::application::messaging::{Context, Handler, HandlerResult, Outcome, ResponseSender, Rule};
    use crate::domain::entities::User;
    use crate::domain::traits::{BotInfo, ReactionResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Platform for Outbox {
        async fn send_message(&self, channel: &str, text: &str) -> Result<(), BotError> {
            if text == "undeliverable" {
                return Err(BotError::Platform("channel_not_found".into()));
            }
            self.sent.lock().unwrap().push((channel.to_string(), text.to_string()));
            Ok(())
        }

        async fn add_reaction(&self, _: &str, _: &str, _: &str) -> Result<ReactionResponse, BotError> {
            Ok(ReactionResponse::ok())
        }

        async fn list_custom_emoji(&self) -> Result<Vec<String>, BotError> {
            Ok(vec![])
        }

        async fn get_user(&self, user_id: &str) -> Result<User, BotError> {
            Ok(User::new(user_id))
        }

        fn bot_info(&self) -> BotInfo {
            BotInfo {
                id: "B1".into(),
                name: "test".into(),
            }
        }
    }

    struct Echo(ResponseSender);

    #[async_trait]
    impl Handler for Echo {
        async fn handle(&self, ctx: &Context) -> HandlerResult {
            if ctx.text() == "!fail" {
                return Err(BotError::Internal("nope".into()));
            }
            self.0.send(ctx.channel(), ctx.text().trim_start_matches("!echo "))?;
            Ok(Outcome::Responded)
        }
    }

    #[tokio::test]
    async fn inbound_errors_do_not_stop_the_loop() {
        let platform = Arc::new(Outbox::default());
        let (sender, outbound) = ResponseSender::channel();
        let dispatcher = MessageDispatcher::new(platform.clone())
            .with_rule(Rule::new("echo", r"!echo .+|!fail", Arc::new(Echo(sender))).unwrap());
        let service = MessageService::new(Arc::new(dispatcher));

        let (tx, inbound) = mpsc::unbounded_channel();
        for text in ["!echo one", "!fail", "ignored", "!echo two", "!echo undeliverable"] {
            tx.send(InboundMessage::new("U1", "C1", text, "1.0")).unwrap();
        }
        drop(tx);

        assert_eq!(service.run_inbound(inbound).await, 3);
        drop(service);

        let delivered = MessageService::run_outbound(platform.clone(), outbound).await;
        assert_eq!(delivered, 2);
        assert_eq!(
            *platform.sent.lock().unwrap(),
            [("C1".to_string(), "one".to_string()), ("C1".to_string(), "two".to_string())]
        );
    }
}
