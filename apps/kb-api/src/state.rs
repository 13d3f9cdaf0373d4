use std::sync::Arc;

use kb_service::{KbService, Providers};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<KbService>,
}
impl AppState {
	/// Builds the corpus index before the server accepts requests.
	pub async fn new(config: kb_config::Config) -> color_eyre::Result<Self> {
		let service = KbService::bootstrap(config, Providers::default()).await?;

		Ok(Self { service: Arc::new(service) })
	}

	pub fn from_service(service: KbService) -> Self {
		Self { service: Arc::new(service) }
	}
}
