// Screening pipeline: extraction → analysis → screening → job matching →
// comparison → recommendation. All LLM calls go through llm_client — no
// direct HTTP calls here.

pub mod context;
pub mod handlers;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod report;
pub mod stages;

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted generation backends for stage and orchestrator tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{GenerationBackend, LlmError};

    /// Replays a fixed script of responses, one per generate call.
    /// `Err(msg)` entries simulate a backend fault at that position.
    pub struct ScriptedBackend {
        script: Mutex<VecDeque<Result<String, String>>>,
    }

    impl ScriptedBackend {
        /// Script where every call succeeds with the next canned reply.
        pub fn replies<I, S>(texts: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::new(texts.into_iter().map(Ok::<S, S>))
        }

        pub fn new<I, S>(script: I) -> Self
        where
            I: IntoIterator<Item = Result<S, S>>,
            S: Into<String>,
        {
            Self {
                script: Mutex::new(
                    script
                        .into_iter()
                        .map(|r| r.map(Into::into).map_err(Into::into))
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            let next = self
                .script
                .lock()
                .expect("script mutex poisoned")
                .pop_front();
            match next {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(LlmError::Api {
                    status: 500,
                    message,
                }),
                None => Err(LlmError::Api {
                    status: 500,
                    message: "script exhausted".to_string(),
                }),
            }
        }
    }

    /// Returns the same text for every generate call.
    pub struct FixedBackend(pub String);

    #[async_trait]
    impl GenerationBackend for FixedBackend {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.clone())
        }
    }
}
