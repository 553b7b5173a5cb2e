//! Scan orchestration: extract, tokenize, ask the model, assemble the result

use crate::config::{Config, ScanMode};
use crate::error::{Result, ResumeScannerError};
use crate::input::InputManager;
use crate::llm::analyzer::LlmAnalyzer;
use crate::llm::client::ChatClient;
use crate::llm::prompts::PromptParams;
use crate::processing::keywords::{flatten_keywords, score_keywords};
use crate::processing::scan_result::{now_millis, ScanRequest, ScanResult};
use crate::processing::text_processor::{dedupe_preserving_order, tokenize_resume};
use log::{info, warn};
use std::time::Instant;

struct Assessment {
    score: f64,
    missing_keywords: Vec<String>,
    summary: String,
}

/// Runs scans against one chat backend
pub struct Scanner<C: ChatClient> {
    client: C,
    input: InputManager,
    analyzer: LlmAnalyzer,
}

impl<C: ChatClient> Scanner<C> {
    pub fn new(config: &Config, client: C) -> Self {
        Self {
            client,
            input: InputManager::new(config.layout),
            analyzer: LlmAnalyzer::new(config.analysis.clone()),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn mode(&self) -> ScanMode {
        self.analyzer.settings().mode
    }

    /// Extract the resume PDF and score it
    pub async fn scan(&self, request: &ScanRequest) -> Result<ScanResult> {
        info!("Extracting text from {}", request.resume.display());
        let text = self.input.extract_text(&request.resume).await?;
        self.scan_text(text, request).await
    }

    /// Score already-extracted resume text
    pub async fn scan_text(&self, resume_text: String, request: &ScanRequest) -> Result<ScanResult> {
        let start = Instant::now();
        let tokens = tokenize_resume(&resume_text);
        if tokens.is_empty() {
            return Err(ResumeScannerError::EmptyDocument(
                "No text could be extracted from the PDF".to_string(),
            ));
        }
        info!("Resume has {} distinct tokens", tokens.len());

        let params = PromptParams {
            resume_content: resume_text,
            job_role: request.job_role.clone(),
            job_level: request.job_level.clone(),
            job_description: request.job_description.clone(),
        };

        let assessment = match self.mode() {
            ScanMode::Analysis => self.run_analysis(&params).await?,
            ScanMode::Keywords => self.run_keywords(&tokens, &params).await?,
        };

        info!(
            "Scan finished in {}ms with score {:.1}",
            start.elapsed().as_millis(),
            assessment.score
        );

        Ok(ScanResult {
            score: assessment.score,
            missing_keywords: assessment.missing_keywords,
            resume_text: params.resume_content,
            job_role: params.job_role,
            job_level: params.job_level,
            date: now_millis(),
            summary: assessment.summary,
        })
    }

    async fn run_analysis(&self, params: &PromptParams) -> Result<Assessment> {
        let parsed = self.analyzer.analyze(&self.client, params).await?;
        Ok(Assessment {
            score: parsed.reply.score,
            missing_keywords: parsed.reply.missing_keywords,
            summary: parsed.reply.summary,
        })
    }

    /// Repeated keyword generation. Failed iterations are skipped; when all
    /// of them fail the configured fallback list is scored instead.
    async fn run_keywords(&self, tokens: &[String], params: &PromptParams) -> Result<Assessment> {
        let settings = self.analyzer.settings();
        let mut total_score = 0.0;
        let mut successful = 0usize;
        let mut matched = 0usize;
        let mut considered = 0usize;
        let mut missing = Vec::new();

        for iteration in 1..=settings.iterations {
            let outcome = match self.analyzer.generate_keywords(&self.client, params).await {
                Ok(value) => score_keywords(tokens, &flatten_keywords(&value)),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(scored) => {
                    info!(
                        "Keyword iteration {}: {}/{} matched ({:.1})",
                        iteration,
                        scored.matched.len(),
                        scored.total(),
                        scored.score
                    );
                    total_score += scored.score;
                    matched += scored.matched.len();
                    considered += scored.total();
                    missing.extend(scored.missing);
                    successful += 1;
                }
                Err(e) => warn!("Keyword iteration {} failed: {}", iteration, e),
            }
        }

        if successful == 0 {
            warn!("All keyword iterations failed, scoring against fallback keywords");
            let fallback: Vec<String> = dedupe_preserving_order(
                settings.fallback_keywords.iter().map(|k| k.trim().to_lowercase()),
            );
            let scored = score_keywords(tokens, &fallback)?;
            let summary = format!(
                "Keyword generation was unavailable, so the resume was checked against {} general keywords; {} matched.",
                scored.total(),
                scored.matched.len()
            );
            return Ok(Assessment {
                score: scored.score,
                missing_keywords: scored.missing,
                summary,
            });
        }

        let summary = format!(
            "Matched {} of {} generated keywords across {} keyword set{}.",
            matched,
            considered,
            successful,
            if successful == 1 { "" } else { "s" }
        );

        Ok(Assessment {
            score: total_score / successful as f64,
            missing_keywords: dedupe_preserving_order(missing),
            summary,
        })
    }
}
