//! Tests for similarity matching

#[cfg(test)]
mod orchestrator_tests {
    use crate::logic::features::{
        ExactFingerprint, FingerprintSet, FuzzyFingerprint, HashAlgorithm, SemanticFingerprint,
    };
    use crate::logic::similarity::{
        cosine_similarity, fuzzy_similarity, Algorithm, MatcherConfig, ReferencePool,
        ReferenceSample, SimilarityOrchestrator, SimilarityScore,
    };

    fn exact(digest: &str) -> ExactFingerprint {
        ExactFingerprint {
            algorithm: HashAlgorithm::Sha256,
            digest: digest.to_string(),
            bytes_read: 10,
        }
    }

    fn fuzzy(signature: Vec<u64>) -> FuzzyFingerprint {
        FuzzyFingerprint {
            algorithm: "minhash".to_string(),
            num_perm: signature.len(),
            signature,
        }
    }

    fn semantic(vector: Vec<f32>) -> SemanticFingerprint {
        SemanticFingerprint {
            dimension: vector.len(),
            vector,
            model_id: "test".to_string(),
        }
    }

    fn sample(id: &str) -> ReferenceSample {
        ReferenceSample {
            reference_id: id.to_string(),
            metadata: None,
            exact_digest: None,
            fuzzy_signature: None,
            embedding: None,
        }
    }

    #[test]
    fn test_primitives() {
        assert_eq!(fuzzy_similarity(&[1, 2, 3, 4], &[1, 2, 9, 9]), 0.5);
        assert_eq!(fuzzy_similarity(&[1, 2, 3], &[1, 2]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        // Opposite vectors clamp to 0
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let set = FingerprintSet {
            exact: Some(exact("DEADBEEF")),
            ..Default::default()
        };
        let mut reference = sample("ref-secret");
        reference.exact_digest = Some("deadbeef".to_string());
        let pool = ReferencePool::new(vec![reference, {
            let mut other = sample("ref-other");
            other.exact_digest = Some("cafebabe".to_string());
            other
        }]);

        let report = SimilarityOrchestrator::default().match_fingerprints(&set, &pool);
        let result = report.get(Algorithm::Exact).unwrap();

        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.compared, 2);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].reference_id, "ref-secret");
    }

    #[test]
    fn test_best_score_reported_below_threshold() {
        let set = FingerprintSet {
            fuzzy: Some(fuzzy(vec![1, 2, 3, 4])),
            ..Default::default()
        };
        let mut reference = sample("ref-half");
        reference.fuzzy_signature = Some(vec![1, 2, 0, 0]);
        let pool = ReferencePool::new(vec![reference]);

        let report = SimilarityOrchestrator::default().match_fingerprints(&set, &pool);
        let result = report.get(Algorithm::Fuzzy).unwrap();

        assert_eq!(result.confidence, 0.5);
        assert!(result.matches.is_empty());
        assert_eq!(result.best_reference.as_ref().unwrap().reference_id, "ref-half");
    }

    #[test]
    fn test_matches_ordered_by_confidence_then_id() {
        let set = FingerprintSet {
            fuzzy: Some(fuzzy(vec![1, 2, 3, 4])),
            ..Default::default()
        };
        let mut b = sample("b");
        b.fuzzy_signature = Some(vec![1, 2, 3, 0]);
        let mut a = sample("a");
        a.fuzzy_signature = Some(vec![1, 2, 3, 0]);
        let mut top = sample("z-top");
        top.fuzzy_signature = Some(vec![1, 2, 3, 4]);
        let pool = ReferencePool::new(vec![b, a, top]);

        let report = SimilarityOrchestrator::default().match_fingerprints(&set, &pool);
        let ids: Vec<_> = report
            .get(Algorithm::Fuzzy)
            .unwrap()
            .matches
            .iter()
            .map(|m| m.reference_id.as_str())
            .collect();

        assert_eq!(ids, vec!["z-top", "a", "b"]);
    }

    #[test]
    fn test_disabled_and_absent_algorithms_skipped() {
        let set = FingerprintSet {
            exact: Some(exact("aa")),
            semantic: Some(semantic(vec![0.6, 0.8])),
            ..Default::default()
        };
        let mut reference = sample("ref");
        reference.exact_digest = Some("aa".to_string());
        reference.fuzzy_signature = Some(vec![1, 2]);
        reference.embedding = Some(vec![0.6, 0.8]);
        let pool = ReferencePool::new(vec![reference]);

        let config = MatcherConfig {
            exact_enabled: false,
            ..Default::default()
        };
        let report = SimilarityOrchestrator::new(config).match_fingerprints(&set, &pool);

        assert!(report.get(Algorithm::Exact).is_none());
        // No fuzzy fingerprint on our side
        assert!(report.get(Algorithm::Fuzzy).is_none());
        assert!(report.get(Algorithm::Semantic).unwrap().confidence > 0.99);
    }

    #[test]
    fn test_empty_pool_reports_nothing() {
        let set = FingerprintSet {
            exact: Some(exact("aa")),
            ..Default::default()
        };
        let report = SimilarityOrchestrator::default().match_fingerprints(&set, &ReferencePool::empty());
        assert!(report.is_empty());
        assert!(report.scores().is_empty());
    }

    #[test]
    fn test_report_converts_to_scores() {
        let set = FingerprintSet {
            exact: Some(exact("aa")),
            ..Default::default()
        };
        let mut reference = sample("ref-1").with_metadata(serde_json::json!({"label": "hr"}));
        reference.exact_digest = Some("AA".to_string());
        let pool = ReferencePool::new(vec![reference]);

        let scores = SimilarityOrchestrator::default()
            .match_fingerprints(&set, &pool)
            .scores();

        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].algorithm, Algorithm::Exact);
        assert_eq!(scores[0].confidence, 1.0);
        assert_eq!(scores[0].reference_id.as_deref(), Some("ref-1"));
        assert_eq!(scores[0].reference_metadata, Some(serde_json::json!({"label": "hr"})));
    }

    #[test]
    fn test_score_confidence_clamped() {
        assert_eq!(SimilarityScore::new(Algorithm::Fuzzy, 1.7).confidence, 1.0);
        assert_eq!(SimilarityScore::new(Algorithm::Fuzzy, -0.2).confidence, 0.0);
        assert_eq!(SimilarityScore::new(Algorithm::Fuzzy, f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!(Algorithm::parse(" Fuzzy "), Some(Algorithm::Fuzzy));
        assert_eq!(Algorithm::parse("ssdeep"), None);
    }
}
