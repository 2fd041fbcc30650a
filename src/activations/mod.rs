//! The activation catalog: pure, stateless elementwise functions paired
//! with their derivative expressed in terms of the already-computed output.
//!
//! Kept as a closed enum rather than a trait object — the design note on
//! "Activation as a capability" calls for exactly this: no dynamic dispatch
//! is needed when the catalog is closed, so a tagged `match` in
//! `activations`/`derivatives` is the whole dispatch story.

use serde::{Deserialize, Serialize};

use crate::errors::{GraphError, GraphResult};

/// Exponent clamp applied before `exp()` in `SoftMax` to avoid overflow.
const SOFTMAX_EXP_CLAMP: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    Sigmoid,
    Tanh,
    BipolarSigmoid { sigma: f32 },
    /// Leaky ReLU. `alpha` is the slope for `x <= 0`.
    ReluLeaky { alpha: f32 },
    SoftMax,
}

impl Activation {
    pub fn bipolar_sigmoid_default() -> Self {
        Activation::BipolarSigmoid { sigma: 1.0 }
    }

    pub fn relu_leaky_default() -> Self {
        Activation::ReluLeaky { alpha: 0.1 }
    }

    /// Name used in the persisted snapshot's `"activation"` field.
    pub fn class_name(&self) -> &'static str {
        match self {
            Activation::Sigmoid => "Sigmoid",
            Activation::Tanh => "TANH",
            Activation::BipolarSigmoid { .. } => "BipolarSigmoid",
            Activation::ReluLeaky { .. } => "ReLU",
            Activation::SoftMax => "SoftMax",
        }
    }

    /// Reconstructs an activation from its persisted class name and, for the
    /// parameterized variants, its parameters. `params` is read in the same
    /// order the fields appear in the variant (e.g. `[sigma]`, `[alpha]`);
    /// an empty slice falls back to the documented default for that class.
    pub fn from_name(name: &str, params: &[f32]) -> GraphResult<Self> {
        match name {
            "Sigmoid" => Ok(Activation::Sigmoid),
            "TANH" | "Tanh" => Ok(Activation::Tanh),
            "BipolarSigmoid" => Ok(Activation::BipolarSigmoid {
                sigma: params.first().copied().unwrap_or(1.0),
            }),
            "ReLU" | "ReluLeaky" => Ok(Activation::ReluLeaky {
                alpha: params.first().copied().unwrap_or(0.1),
            }),
            "SoftMax" => Ok(Activation::SoftMax),
            other => Err(GraphError::UnknownActivation(other.to_string())),
        }
    }

    /// Any parameters the variant carries, in persistence order — used to
    /// round-trip `from_name`/`class_name` through a snapshot.
    pub fn params(&self) -> Vec<f32> {
        match self {
            Activation::BipolarSigmoid { sigma } => vec![*sigma],
            Activation::ReluLeaky { alpha } => vec![*alpha],
            _ => Vec::new(),
        }
    }

    /// Computes `f(triggers)`, same length as input.
    pub fn activations(&self, triggers: &[f32]) -> Vec<f32> {
        match self {
            Activation::Sigmoid => triggers.iter().map(|&x| sigmoid(x)).collect(),
            Activation::Tanh => triggers.iter().map(|&x| x.tanh()).collect(),
            Activation::BipolarSigmoid { sigma } => triggers
                .iter()
                .map(|&x| {
                    let e = (-sigma * x).exp();
                    (1.0 - e) / (1.0 + e)
                })
                .collect(),
            Activation::ReluLeaky { alpha } => triggers
                .iter()
                .map(|&x| if x > 0.0 { x } else { alpha * x })
                .collect(),
            Activation::SoftMax => softmax(triggers),
        }
    }

    /// Computes `f'` as a function of the already-computed outputs `y`.
    pub fn derivatives(&self, outputs: &[f32]) -> Vec<f32> {
        match self {
            Activation::Sigmoid => outputs.iter().map(|&y| y * (1.0 - y)).collect(),
            Activation::Tanh => outputs.iter().map(|&y| (1.0 + y) * (1.0 - y)).collect(),
            Activation::BipolarSigmoid { sigma } => outputs
                .iter()
                .map(|&y| (sigma / 2.0) * (1.0 + y) * (1.0 - y))
                .collect(),
            // Open question (a) in the spec: the derivative evaluates to 0
            // when alpha == 0 and 1 otherwise, regardless of the sign of the
            // output. This looks wrong for leaky-ReLU semantics but is
            // documented as deliberate — implemented literally, not
            // silently "fixed" (see DESIGN.md).
            Activation::ReluLeaky { alpha } => {
                let d = if *alpha == 0.0 { 0.0 } else { 1.0 };
                outputs.iter().map(|_| d).collect()
            }
            // Open question (b): returned as all-ones, matching a paired-use
            // convention with cross-entropy loss rather than the true
            // Jacobian. Implemented literally (see DESIGN.md).
            Activation::SoftMax => vec![1.0; outputs.len()],
        }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(triggers: &[f32]) -> Vec<f32> {
    let exps: Vec<f32> = triggers
        .iter()
        .map(|&x| x.clamp(-SOFTMAX_EXP_CLAMP, SOFTMAX_EXP_CLAMP).exp())
        .collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 {
        // Numeric condition per §7: an all-zero sum leaves outputs
        // unnormalized, defined as zeros, rather than dividing by zero.
        return vec![0.0; triggers.len()];
    }
    exps.iter().map(|&e| e / sum).collect()
}
