pub mod openai_mind_map_agent;
pub mod prompt;
pub mod remote_ask_client;

pub use openai_mind_map_agent::{HistoryStats, OpenAiMindMapAgent};
pub use remote_ask_client::RemoteAskClient;
