//! Bundle of the service clients the pipeline talks to.

use std::sync::Arc;

use crate::ports::{MediaPort, MessagingPort, VisionPort};

/// Explicitly constructed collaborators handed to the pipeline service.
#[derive(Clone)]
pub struct ServiceClients {
    /// Media retrieval backend.
    pub media: Arc<dyn MediaPort>,
    /// Image classification backend.
    pub vision: Arc<dyn VisionPort>,
    /// Message delivery backend.
    pub messaging: Arc<dyn MessagingPort>,
}

impl ServiceClients {
    /// Bundle the three collaborators.
    #[must_use]
    pub fn new(
        media: Arc<dyn MediaPort>,
        vision: Arc<dyn VisionPort>,
        messaging: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            media,
            vision,
            messaging,
        }
    }
}
