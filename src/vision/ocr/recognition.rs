// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition (CRNN + CTC)

use anyhow::{anyhow, Context, Result};
use ndarray::{Array2, Array4, ArrayView2, IxDyn};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::REC_INPUT_HEIGHT;

/// Text read from one region
#[derive(Debug, Clone, PartialEq)]
pub struct Recognized {
    pub text: String,
    /// Mean probability of the emitted characters (0.0-1.0)
    pub confidence: f32,
}

/// Read a PaddleOCR character dictionary, one character per line
///
/// Index 0 is reserved for the CTC blank; a trailing space class is appended
/// as PaddleOCR does with `use_space_char`.
pub fn parse_dictionary<R: BufRead>(reader: R) -> Result<Vec<char>> {
    let mut dictionary = vec!['\0'];
    for line in reader.lines() {
        let line = line.context("Failed to read dictionary line")?;
        if let Some(ch) = line.chars().next() {
            dictionary.push(ch);
        }
    }
    dictionary.push(' ');
    Ok(dictionary)
}

pub fn load_dictionary<P: AsRef<Path>>(path: P) -> Result<Vec<char>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open dictionary: {}", path.display()))?;
    parse_dictionary(BufReader::new(file))
}

/// Best-path CTC decoding over a `[time, classes]` probability matrix
///
/// Repeated classes collapse to one character unless separated by a blank.
pub fn greedy_ctc_decode(probabilities: ArrayView2<f32>, dictionary: &[char]) -> Recognized {
    let mut text = String::new();
    let mut total = 0.0f32;
    let mut emitted = 0usize;
    let mut previous = 0usize;

    for row in probabilities.rows() {
        let (best, prob) = row
            .iter()
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |acc, (i, &p)| {
                if p > acc.1 {
                    (i, p)
                } else {
                    acc
                }
            });

        if best != 0 && best != previous {
            if let Some(&ch) = dictionary.get(best) {
                text.push(ch);
                total += prob;
                emitted += 1;
            }
        }
        previous = best;
    }

    let confidence = if emitted == 0 {
        0.0
    } else {
        (total / emitted as f32).clamp(0.0, 1.0)
    };

    Recognized {
        text: text.trim().to_string(),
        confidence,
    }
}

/// CRNN recognition model (CPU)
#[derive(Clone)]
pub struct CharacterRecognizer {
    session: Arc<Mutex<Session>>,
    dictionary: Arc<Vec<char>>,
    input_name: String,
}

impl std::fmt::Debug for CharacterRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterRecognizer")
            .field("dictionary_size", &self.dictionary.len())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl CharacterRecognizer {
    pub fn load<P: AsRef<Path>>(model_path: P, dict_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let dict_path = dict_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR recognition model not found: {}", model_path.display());
        }
        if !dict_path.exists() {
            anyhow::bail!("OCR character dictionary not found: {}", dict_path.display());
        }

        let dictionary = load_dictionary(dict_path)?;
        info!(
            "Loading OCR recognition model from {} ({} classes)",
            model_path.display(),
            dictionary.len()
        );

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("Failed to load OCR recognition model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            dictionary: Arc::new(dictionary),
            input_name,
        })
    }

    /// Recognize a `[1, 3, 48, W]` tensor built by `recognition_tensor`
    pub fn recognize(&self, input: &Array4<f32>) -> Result<Recognized> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 || shape[2] != REC_INPUT_HEIGHT as usize || shape[3] < 4 {
            anyhow::bail!(
                "Invalid input shape: {:?}, expected [1, 3, {}, W>=4]",
                shape,
                REC_INPUT_HEIGHT
            );
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("OCR recognition session lock poisoned"))?;
        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Recognition inference failed")?;
        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let out_shape = output.shape().to_vec();
        let probabilities = match out_shape.len() {
            3 => Array2::from_shape_fn((out_shape[1], out_shape[2]), |(t, c)| {
                output[IxDyn(&[0, t, c])]
            }),
            2 => Array2::from_shape_fn((out_shape[0], out_shape[1]), |(t, c)| {
                output[IxDyn(&[t, c])]
            }),
            _ => anyhow::bail!("Unexpected recognition output shape: {:?}", out_shape),
        };

        let recognized = greedy_ctc_decode(probabilities.view(), &self.dictionary);
        debug!(
            "Recognized '{}' (confidence {:.2})",
            recognized.text, recognized.confidence
        );
        Ok(recognized)
    }
}
