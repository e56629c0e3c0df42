//! Pipeline tests with scripted clients

#[cfg(test)]
mod pipeline_tests {
    use crate::{PassageStore, QaPipeline};
    use async_trait::async_trait;
    use insta::assert_yaml_snapshot;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use stylerag_core::{
        EmbeddingClient, Error, GenerationConfig, GenerationResult, IndexStats, LLMProvider,
        MatchMetadata, Passage, PipelineConfig, QaEngine, Result, SearchMatch, SourceFields,
        VectorIndex,
    };

    const GUIDE_LINK: &str = "https://google.github.io/styleguide/cppguide.html#General_Naming_Rules";

    struct ScriptedEmbedder {
        fail: bool,
        delay: Duration,
    }

    impl ScriptedEmbedder {
        fn ok() -> Self {
            Self {
                fail: false,
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl EmbeddingClient for ScriptedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(Error::Authentication("invalid api key".to_string()));
            }
            Ok(vec![0.1, 0.2, 0.3, 0.4])
        }

        fn embedding_model(&self) -> &str {
            "text-embedding-ada-002"
        }
    }

    struct ScriptedIndex {
        matches: Vec<SearchMatch>,
        fail: bool,
        queries: AtomicUsize,
    }

    #[async_trait]
    impl VectorIndex for ScriptedIndex {
        async fn query(&self, _vector: &[f32], top_k: usize) -> Result<Vec<SearchMatch>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Network("index unreachable".to_string()));
            }
            Ok(self.matches.iter().take(top_k).cloned().collect())
        }

        async fn describe_stats(&self) -> Result<IndexStats> {
            Ok(IndexStats {
                dimension: 4,
                vector_count: 2317,
            })
        }

        fn name(&self) -> &str {
            "codestyle-semantic-search"
        }
    }

    struct ScriptedLlm {
        fail: bool,
    }

    #[async_trait]
    impl LLMProvider for ScriptedLlm {
        async fn complete(
            &self,
            _system_instruction: &str,
            _user_message: &str,
            config: &GenerationConfig,
        ) -> Result<GenerationResult> {
            if self.fail {
                return Err(Error::Network("upstream reset".to_string()));
            }
            Ok(GenerationResult {
                text: "Names should be descriptive.".to_string(),
                model_id: config.model_id.clone(),
                tokens_used: Some(42),
            })
        }

        fn model_id(&self) -> &str {
            "gpt-3.5-turbo"
        }
    }

    fn hit(id: &str, score: f32, token_count: usize, source: SourceFields) -> SearchMatch {
        SearchMatch {
            id: id.to_string(),
            score,
            metadata: MatchMetadata {
                token_count,
                source,
            },
        }
    }

    fn naming_rules() -> SourceFields {
        SourceFields {
            document: Some("cppguide".to_string()),
            chapter: Some("Naming".to_string()),
            section: Some("General Naming Rules".to_string()),
            link: Some(GUIDE_LINK.to_string()),
        }
    }

    fn passages() -> PassageStore {
        PassageStore::from_passages(vec![
            Passage {
                id: "a".to_string(),
                text: "Optimize for readability using names that would be clear even to people on a different team.".to_string(),
                token_count: 100,
                source: naming_rules(),
            },
            Passage {
                id: "b".to_string(),
                text: "Filenames should be all lowercase and can include underscores or dashes.".to_string(),
                token_count: 100,
                source: SourceFields {
                    document: Some("cppguide".to_string()),
                    chapter: Some("Naming".to_string()),
                    section: Some("File Names".to_string()),
                    link: None,
                },
            },
            Passage {
                id: "c".to_string(),
                text: "A very long passage about formatting.".to_string(),
                token_count: 4000,
                source: SourceFields::default(),
            },
        ])
    }

    fn index(fail: bool) -> ScriptedIndex {
        ScriptedIndex {
            matches: vec![
                hit("a", 0.75, 100, naming_rules()),
                hit("b", 0.5, 100, SourceFields::default()),
                hit("c", 0.25, 4000, SourceFields::default()),
            ],
            fail,
            queries: AtomicUsize::new(0),
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            max_context_tokens: 250,
            ..Default::default()
        }
    }

    async fn ready_pipeline(
        embedder: ScriptedEmbedder,
        index: ScriptedIndex,
        llm: ScriptedLlm,
        config: PipelineConfig,
    ) -> QaPipeline<ScriptedEmbedder, ScriptedIndex, ScriptedLlm> {
        let mut pipeline = QaPipeline::new(
            Arc::new(embedder),
            Arc::new(index),
            Arc::new(passages()),
            llm,
            config,
        );
        pipeline.initialize().await.unwrap();
        pipeline
    }

    #[tokio::test]
    async fn test_end_to_end_snapshot() {
        let pipeline = ready_pipeline(
            ScriptedEmbedder::ok(),
            index(false),
            ScriptedLlm { fail: false },
            config(),
        )
        .await;

        let response = pipeline.answer("How to name a variable?").await.unwrap();

        assert_yaml_snapshot!(response, @r###"
        ---
        answer:
          text: Names should be descriptive.
          citations:
            - document: cppguide
              chapter: Naming
              section: General Naming Rules
              link: "https://google.github.io/styleguide/cppguide.html#General_Naming_Rules"
            - document: cppguide
              chapter: Naming
              section: File Names
              link: ~
        matches:
          - id: a
            score: 0.75
            metadata:
              token_count: 100
              document: cppguide
              chapter: Naming
              section: General Naming Rules
              link: "https://google.github.io/styleguide/cppguide.html#General_Naming_Rules"
          - id: b
            score: 0.5
            metadata:
              token_count: 100
        "###);
    }

    #[tokio::test]
    async fn test_diagnostics() {
        let pipeline = ready_pipeline(
            ScriptedEmbedder::ok(),
            index(false),
            ScriptedLlm { fail: false },
            config(),
        )
        .await;

        let diagnostics = pipeline.diagnostics().unwrap();
        assert_eq!(diagnostics.index_name, "codestyle-semantic-search");
        assert_eq!(diagnostics.vector_count, 2317);
        assert_eq!(diagnostics.dimension, 4);
        assert_eq!(diagnostics.embedding_model, "text-embedding-ada-002");
        assert_eq!(diagnostics.generation_model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_generation_failure_is_absorbed() {
        let pipeline = ready_pipeline(
            ScriptedEmbedder::ok(),
            index(false),
            ScriptedLlm { fail: true },
            config(),
        )
        .await;

        let response = pipeline.answer("How to name a variable?").await.unwrap();
        assert!(response.answer.is_empty());
        assert!(response.answer.citations.is_empty());
        assert_eq!(response.matches.len(), 2);
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts_before_search() {
        let embedder = ScriptedEmbedder {
            fail: true,
            delay: Duration::ZERO,
        };
        let pipeline =
            ready_pipeline(embedder, index(false), ScriptedLlm { fail: false }, config()).await;

        let err = pipeline.answer("How to name a variable?").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert_eq!(err.to_string(), "Embedding error: Authentication error: invalid api key");
    }

    #[tokio::test]
    async fn test_search_failure_aborts() {
        let pipeline = ready_pipeline(
            ScriptedEmbedder::ok(),
            index(true),
            ScriptedLlm { fail: false },
            config(),
        )
        .await;

        let err = pipeline.answer("How to name a variable?").await.unwrap_err();
        assert!(matches!(err, Error::Search(_)));
    }

    #[tokio::test]
    async fn test_slow_embedding_hits_deadline() {
        let embedder = ScriptedEmbedder {
            fail: false,
            delay: Duration::from_millis(500),
        };
        let config = PipelineConfig {
            request_timeout: Duration::from_millis(20),
            ..config()
        };
        let pipeline = ready_pipeline(embedder, index(false), ScriptedLlm { fail: false }, config).await;

        let err = pipeline.answer("How to name a variable?").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(err.to_string().contains("Timeout"));
    }

    #[tokio::test]
    async fn test_each_request_queries_once() {
        let pipeline = ready_pipeline(
            ScriptedEmbedder::ok(),
            index(true),
            ScriptedLlm { fail: false },
            config(),
        )
        .await;

        // No retries: two failing requests mean exactly two index queries.
        assert!(pipeline.answer("first").await.is_err());
        assert!(pipeline.answer("second").await.is_err());
        let queries = pipeline_index_queries(&pipeline);
        assert_eq!(queries, 2);
    }

    fn pipeline_index_queries(
        pipeline: &QaPipeline<ScriptedEmbedder, ScriptedIndex, ScriptedLlm>,
    ) -> usize {
        pipeline.index().queries.load(Ordering::SeqCst)
    }
}
