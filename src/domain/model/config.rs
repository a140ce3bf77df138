use serde::{Deserialize, Serialize};

/// Backend family a model architecture is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Local serving via an Ollama daemon
    Ollama,
    /// Hosted text-generation-inference endpoint
    Hf,
    /// OpenAI-compatible chat completions endpoint
    Instruct,
}

impl Default for ModelType {
    fn default() -> Self {
        Self::Ollama
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::Hf => write!(f, "hf"),
            Self::Instruct => write!(f, "instruct"),
        }
    }
}

/// Sampling parameters for hosted-inference backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_typical_p")]
    pub typical_p: f32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f32,
}

fn default_max_new_tokens() -> u32 {
    20
}

fn default_top_k() -> u32 {
    3
}

fn default_top_p() -> f32 {
    0.95
}

fn default_typical_p() -> f32 {
    0.95
}

fn default_temperature() -> f32 {
    0.9
}

fn default_repetition_penalty() -> f32 {
    1.01
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: default_max_new_tokens(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            typical_p: default_typical_p(),
            temperature: default_temperature(),
            repetition_penalty: default_repetition_penalty(),
        }
    }
}

/// Immutable description of one configured model architecture.
///
/// Built once at configuration load; `id` is the key used to route results
/// back to an output slot and stays stable across reloads of the same
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    pub endpoint: String,
    pub model_name: String,
    pub model_source: Option<String>,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    pub uses_rag: bool,
    pub uses_reranking: bool,
    #[serde(skip)]
    pub generation: GenerationParams,
}

impl ModelConfig {
    /// Create a config with the fields every architecture must carry.
    /// The remaining fields take their documented defaults.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            endpoint: endpoint.into(),
            model_name: "default_model_name".to_string(),
            model_source: None,
            model_type: ModelType::default(),
            uses_rag: false,
            uses_reranking: false,
            generation: GenerationParams::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub fn with_model_source(mut self, model_source: impl Into<String>) -> Self {
        self.model_source = Some(model_source.into());
        self
    }

    pub fn with_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    pub fn with_rag(mut self, uses_rag: bool) -> Self {
        self.uses_rag = uses_rag;
        self
    }

    pub fn with_reranking(mut self, uses_reranking: bool) -> Self {
        self.uses_reranking = uses_reranking;
        self
    }

    pub fn with_generation(mut self, generation: GenerationParams) -> Self {
        self.generation = generation;
        self
    }
}
