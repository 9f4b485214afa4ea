//! Standalone predictor artifact.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use burn::module::Module;
use burn::prelude::*;
use burn::record::{BinBytesRecorder, FullPrecisionSettings, Recorder};

use crate::config::PredictorConfig;
use crate::error::{NeuralPlanError, Result};
use crate::nn::Predictor;

const MAGIC: [u8; 4] = *b"NPFZ";
const VERSION: u32 = 1;

/// Freeze a trained predictor into a self-describing file.
///
/// The file carries the predictor configuration alongside the parameters, so
/// loading needs no external size information. The same parameters always
/// freeze to the same bytes.
pub fn freeze_predictor<B: Backend, P: AsRef<Path>>(
    predictor: &Predictor<B>,
    config: &PredictorConfig,
    path: P,
) -> Result<()> {
    if config.input_size != predictor.input_size() || config.output_size != predictor.output_size()
    {
        return Err(NeuralPlanError::Export {
            message: format!(
                "predictor sizes ({}, {}) do not match the configuration ({}, {})",
                predictor.input_size(),
                predictor.output_size(),
                config.input_size,
                config.output_size
            ),
        });
    }

    let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
    let params = recorder
        .record(predictor.clone().into_record(), ())
        .map_err(|e| NeuralPlanError::Export {
            message: format!("failed to encode predictor parameters: {e}"),
        })?;
    let config_json = serde_json::to_vec(config).map_err(|e| NeuralPlanError::Export {
        message: format!("failed to encode predictor configuration: {e}"),
    })?;

    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(&MAGIC)?;
    w.write_all(&VERSION.to_le_bytes())?;
    w.write_all(&(config_json.len() as u32).to_le_bytes())?;
    w.write_all(&config_json)?;
    w.write_all(&(params.len() as u64).to_le_bytes())?;
    w.write_all(&params)?;
    w.flush()?;

    Ok(())
}

/// A predictor restored from a frozen artifact, ready for inference.
#[derive(Debug)]
pub struct FrozenPredictor<B: Backend> {
    predictor: Predictor<B>,
    config: PredictorConfig,
}

impl<B: Backend> FrozenPredictor<B> {
    /// Load a frozen predictor from a file.
    pub fn load<P: AsRef<Path>>(path: P, device: &B::Device) -> Result<Self> {
        let mut r = BufReader::new(File::open(path)?);

        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(NeuralPlanError::Export {
                message: "not a frozen predictor (bad magic)".to_string(),
            });
        }
        let mut version_bytes = [0u8; 4];
        r.read_exact(&mut version_bytes)?;
        let version = u32::from_le_bytes(version_bytes);
        if version != VERSION {
            return Err(NeuralPlanError::Export {
                message: format!("unsupported frozen predictor version {version}"),
            });
        }

        let mut len_bytes = [0u8; 4];
        r.read_exact(&mut len_bytes)?;
        let mut config_json = vec![0u8; u32::from_le_bytes(len_bytes) as usize];
        r.read_exact(&mut config_json)?;
        let config: PredictorConfig =
            serde_json::from_slice(&config_json).map_err(|e| NeuralPlanError::Export {
                message: format!("failed to decode predictor configuration: {e}"),
            })?;

        let mut params_len_bytes = [0u8; 8];
        r.read_exact(&mut params_len_bytes)?;
        let mut params = vec![0u8; u64::from_le_bytes(params_len_bytes) as usize];
        r.read_exact(&mut params)?;

        let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
        let record = recorder
            .load(params, device)
            .map_err(|e| NeuralPlanError::Export {
                message: format!("failed to decode predictor parameters: {e}"),
            })?;
        let predictor = Predictor::new(&config, device).load_record(record);

        Ok(Self { predictor, config })
    }

    /// Predict the next configuration for a batch of concatenated inputs.
    pub fn predict(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        self.predictor.forward(input)
    }

    /// Declared input width.
    pub fn input_size(&self) -> usize {
        self.config.input_size
    }

    /// Declared output width.
    pub fn output_size(&self) -> usize {
        self.config.output_size
    }
}
