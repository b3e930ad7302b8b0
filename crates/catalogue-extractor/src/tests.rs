//! Behavioural tests for the extraction client against a scripted service

#[cfg(test)]
mod tests {
    use crate::{ExtractionClient, ExtractionError, ExtractorConfig};
    use catalogue_llm::{LlmError, MockProvider, MockReply};
    use serde_json::json;
    use std::time::Duration;

    fn gpt4_value() -> serde_json::Value {
        json!({
            "model_name": "gpt-4",
            "organization": "OpenAI",
            "release_date": "2023-03-01",
            "description": "A large multimodal model.",
            "license": null,
            "metadata": null
        })
    }

    fn client(provider: &MockProvider) -> ExtractionClient<MockProvider> {
        ExtractionClient::new(provider.clone(), ExtractorConfig::default())
    }

    #[tokio::test]
    async fn test_empty_text_makes_no_call() {
        let provider = MockProvider::returning(gpt4_value());
        let client = client(&provider);

        for text in ["", "   ", "\n\t  "] {
            let result = client.extract(text, true).await;
            assert!(matches!(result, Err(ExtractionError::InvalidInput(_))));
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_text_too_long_makes_no_call() {
        let provider = MockProvider::returning(gpt4_value());
        let mut config = ExtractorConfig::default();
        config.max_text_length = 100;
        let client = ExtractionClient::new(provider.clone(), config);

        let result = client.extract(&"a".repeat(101), false).await;
        assert!(matches!(result, Err(ExtractionError::InvalidInput(_))));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_extraction() {
        let provider = MockProvider::returning(gpt4_value()).with_model("claude-sonnet-4-5");
        let outcome = client(&provider)
            .extract("GPT-4 was released by OpenAI in March 2023.", true)
            .await
            .unwrap();

        let record = outcome.record.unwrap();
        assert_eq!(record.model_name.as_deref(), Some("gpt-4"));
        assert_eq!(record.organization.as_deref(), Some("OpenAI"));
        assert!(record.license.is_none());
        assert_eq!(outcome.consumption_units, 650);
        assert_eq!(outcome.model_used, "claude-sonnet-4-5");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_request_is_structured_and_carries_text() {
        let provider = MockProvider::returning(gpt4_value());
        client(&provider).extract("Some model text", false).await.unwrap();

        let request = &provider.calls()[0].request;
        assert!(request.force_structured);
        assert!(!request.cache_prefix);
        assert!(request.user_text.contains("Some model text"));
        assert!(request.output_schema["properties"]["model_name"].is_object());
    }

    #[tokio::test]
    async fn test_cache_hint_does_not_change_result() {
        let provider = MockProvider::returning(gpt4_value());
        let client = client(&provider);

        let cached = client.extract("GPT-4 text", true).await.unwrap();
        let uncached = client.extract("GPT-4 text", false).await.unwrap();

        assert_eq!(cached, uncached);
        let calls = provider.calls();
        assert!(calls[0].request.cache_prefix);
        assert!(!calls[1].request.cache_prefix);
    }

    #[tokio::test]
    async fn test_extract_default_uses_configured_cache_flag() {
        let provider = MockProvider::returning(gpt4_value());
        client(&provider).extract_default("GPT-4 text").await.unwrap();
        assert!(provider.calls()[0].request.cache_prefix);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_then_success() {
        let failures = 2;
        let provider = MockProvider::returning(gpt4_value())
            .fail_times(failures, LlmError::RateLimited("slow down".into()));

        let outcome = client(&provider).extract("GPT-4 text", true).await.unwrap();

        assert!(outcome.record.is_some());
        assert_eq!(provider.call_count(), failures + 1);
        assert_eq!(
            provider.gaps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_transient_exhausts_retries() {
        let provider = MockProvider::failing(LlmError::Server {
            status: 503,
            message: "overloaded".into(),
        });
        let config = ExtractorConfig::default();
        let max_retries = config.max_retries;
        let client = ExtractionClient::new(provider.clone(), config);

        let err = client.extract("GPT-4 text", true).await.unwrap_err();

        match err {
            ExtractionError::TransientCallFailure { attempts, .. } => {
                assert_eq!(attempts, max_retries + 1)
            }
            other => panic!("expected TransientCallFailure, got {:?}", other),
        }
        assert_eq!(provider.call_count(), (max_retries + 1) as usize);
        assert_eq!(
            provider.gaps(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_failures_are_retried() {
        let provider = MockProvider::returning(gpt4_value())
            .fail_times(1, LlmError::Connection("reset by peer".into()));

        assert!(client(&provider).extract("GPT-4 text", true).await.is_ok());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_failure_single_call() {
        for error in [
            LlmError::BadRequest("malformed".into()),
            LlmError::Authentication("invalid x-api-key".into()),
            LlmError::NotFound("model".into()),
        ] {
            let provider = MockProvider::failing(error);
            let err = client(&provider).extract("GPT-4 text", true).await.unwrap_err();

            assert!(matches!(err, ExtractionError::NonRetryableCallFailure(_)));
            assert_eq!(provider.call_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_empty_result_still_reports_consumption() {
        let provider = MockProvider::returning(json!({
            "model_name": null, "organization": null, "release_date": null,
            "description": null, "license": null, "metadata": null
        }));

        let outcome = client(&provider)
            .extract("Some random text about dogs", true)
            .await
            .unwrap();

        assert!(outcome.record.is_none());
        assert!(outcome.consumption_units > 0);
    }

    #[tokio::test]
    async fn test_missing_structured_value_is_empty_outcome() {
        let provider = MockProvider::empty();
        let outcome = client(&provider).extract("Dogs are great", false).await.unwrap();
        assert!(outcome.record.is_none());
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_not_retried() {
        let provider = MockProvider::returning(json!({"model_name": ["not", "a", "string"]}));
        let err = client(&provider).extract("GPT-4 text", true).await.unwrap_err();

        assert!(matches!(err, ExtractionError::NonRetryableCallFailure(_)));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_mix_recovers() {
        let provider = MockProvider::failing(LlmError::BadRequest("unused".into()));
        provider.push_reply(MockReply::Fail(LlmError::Timeout("slow".into())));
        provider.push_reply(MockReply::Structured(gpt4_value()));

        let outcome = client(&provider).extract("GPT-4 text", true).await.unwrap();
        assert!(outcome.record.is_some());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_blank_fields_come_back_absent() {
        let provider = MockProvider::returning(json!({
            "model_name": "gpt-4",
            "organization": "",
            "release_date": "  ",
            "license": "",
            "metadata": {}
        }));

        let outcome = client(&provider).extract("GPT-4 text", true).await.unwrap();
        let record = outcome.record.unwrap();

        assert_eq!(record.model_name.as_deref(), Some("gpt-4"));
        assert_eq!(record.organization, None);
        assert_eq!(record.release_date, None);
        assert_eq!(record.license, None);
        assert_eq!(record.metadata, None);
    }
}
