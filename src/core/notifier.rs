use crate::domain::model::{LeaveUpdate, PushNotification};
use crate::domain::ports::{PushGateway, RealtimeDirectory};
use std::sync::Arc;

/// Best-effort push delivery to every device registered for a faculty email.
///
/// Callers only get a boolean: a failed lookup, an empty token list and a
/// rejected message all come back as `false`. Details go to the log.
pub struct LeaveNotifier {
    directory: Arc<dyn RealtimeDirectory>,
    push: Arc<dyn PushGateway>,
}

impl LeaveNotifier {
    pub fn new(directory: Arc<dyn RealtimeDirectory>, push: Arc<dyn PushGateway>) -> Self {
        Self { directory, push }
    }

    pub async fn notify(&self, email: &str, notification: &PushNotification) -> bool {
        let tokens = match self.directory.device_tokens(email).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!("Device token lookup failed for {}: {}", email, e);
                return false;
            }
        };

        if tokens.is_empty() {
            tracing::info!("No device registered for {}", email);
            return false;
        }

        // 每個 token 都送一次，不因前一個成功就停止
        let mut delivered = 0;
        for token in &tokens {
            if self.push.send(token, notification).await {
                delivered += 1;
            }
        }

        tracing::info!(
            "📨 Delivered to {}/{} devices for {}",
            delivered,
            tokens.len(),
            email
        );
        delivered > 0
    }

    pub async fn notify_leave(&self, update: &LeaveUpdate) -> bool {
        self.notify(&update.faculty_email, &update.to_notification())
            .await
    }
}
