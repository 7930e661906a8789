use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use gleaner::data_models::Article;
use gleaner::error::SummaryError;
use gleaner::summarizer::{
    BatchSummarizer, SUMMARY_FAILED, SUMMARY_UNAVAILABLE, SummaryModel,
};

mod test_helpers {
    use super::*;

    type Script = Box<dyn Fn(usize, &[Article]) -> Result<Vec<String>, SummaryError> + Send + Sync>;

    /// Answers each call with whatever the script returns for that call index,
    /// and records the size of every batch it was given.
    pub struct ScriptedModel {
        script: Script,
        calls: Mutex<Vec<usize>>,
    }

    impl ScriptedModel {
        pub fn new(
            script: impl Fn(usize, &[Article]) -> Result<Vec<String>, SummaryError>
            + Send
            + Sync
            + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                script: Box::new(script),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn batch_sizes(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl fmt::Debug for ScriptedModel {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("ScriptedModel").finish()
        }
    }

    #[async_trait]
    impl SummaryModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn summarize_batch(&self, batch: &[Article]) -> Result<Vec<String>, SummaryError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(batch.len());
                calls.len() - 1
            };
            (self.script)(call, batch)
        }
    }

    /// "summary of <title>" for every item.
    pub fn echo(batch: &[Article]) -> Vec<String> {
        batch
            .iter()
            .map(|a| format!("summary of {}", a.title().unwrap_or("?")))
            .collect()
    }

    pub fn articles(n: usize) -> Vec<Article> {
        (1..=n)
            .map(|i| serde_json::from_value(json!({"id": i, "title": format!("t{i}")})).unwrap())
            .collect()
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_batches_are_fixed_size_and_in_order() {
    let model = ScriptedModel::new(|_, batch| Ok(echo(batch)));
    let summarizer = BatchSummarizer::new(model.clone(), 3);

    let got = summarizer.summarize(&articles(7)).await;
    assert_eq!(model.batch_sizes(), vec![3, 3, 1]);
    let expected: Vec<String> = (1..=7).map(|i| format!("summary of t{i}")).collect();
    assert_eq!(got, expected);
}

#[tokio::test]
async fn test_failed_batch_is_isolated() {
    let model = ScriptedModel::new(|call, batch| {
        if call == 1 {
            Err(SummaryError::EmptyResponse)
        } else {
            Ok(echo(batch))
        }
    });
    let summarizer = BatchSummarizer::new(model.clone(), 3);

    let got = summarizer.summarize(&articles(9)).await;
    assert_eq!(model.batch_sizes().len(), 3);
    assert_eq!(&got[0..3], &["summary of t1", "summary of t2", "summary of t3"]);
    assert!(got[3..6].iter().all(|s| s == SUMMARY_FAILED));
    assert_eq!(&got[6..9], &["summary of t7", "summary of t8", "summary of t9"]);
}

#[tokio::test]
async fn test_short_reply_discards_whole_batch() {
    let model = ScriptedModel::new(|call, batch| {
        let mut summaries = echo(batch);
        if call == 0 {
            summaries.pop();
        }
        Ok(summaries)
    });
    let summarizer = BatchSummarizer::new(model, 3);

    let got = summarizer.summarize(&articles(5)).await;
    assert_eq!(got.len(), 5);
    assert!(got[0..3].iter().all(|s| s == SUMMARY_UNAVAILABLE));
    assert_eq!(&got[3..5], &["summary of t4", "summary of t5"]);
}

#[tokio::test]
async fn test_long_reply_discards_whole_batch() {
    let model = ScriptedModel::new(|_, batch| {
        let mut summaries = echo(batch);
        summaries.push("extra".to_string());
        Ok(summaries)
    });
    let summarizer = BatchSummarizer::new(model, 2);

    let got = summarizer.summarize(&articles(2)).await;
    assert_eq!(got, vec![SUMMARY_UNAVAILABLE, SUMMARY_UNAVAILABLE]);
}

#[tokio::test]
async fn test_failed_batches_are_not_retried() {
    let model = ScriptedModel::new(|_, _| Err(SummaryError::EmptyResponse));
    let summarizer = BatchSummarizer::new(model.clone(), 3);

    let got = summarizer.summarize(&articles(4)).await;
    assert_eq!(model.batch_sizes(), vec![3, 1]);
    assert!(got.iter().all(|s| s == SUMMARY_FAILED));
}

#[tokio::test]
async fn test_empty_input_makes_no_calls() {
    let model = ScriptedModel::new(|_, batch| Ok(echo(batch)));
    let summarizer = BatchSummarizer::with_default_batch_size(model.clone());

    assert!(summarizer.summarize(&[]).await.is_empty());
    assert!(model.batch_sizes().is_empty());
    assert_eq!(summarizer.batch_size(), 3);
}

#[tokio::test]
async fn test_zero_batch_size_is_clamped() {
    let model = ScriptedModel::new(|_, batch| Ok(echo(batch)));
    let summarizer = BatchSummarizer::new(model.clone(), 0);

    let got = summarizer.summarize(&articles(2)).await;
    assert_eq!(got.len(), 2);
    assert_eq!(model.batch_sizes(), vec![1, 1]);
}
