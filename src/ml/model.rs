// ============================================================
// Layer 5 — Weather Forecast Model
// ============================================================
// Encoder–decoder transformer (Vaswani et al. 2017):
//
//   WeatherEncoder      self-attention over the H-hour NWP
//                       input sequence; positions injected via
//                       a fixed sinusoidal table
//   TemperatureDecoder  queries built from the run-hour encoding
//                       (broadcast to every forecast step)
//                       concatenated with each step's target
//                       time encoding; causal self-attention
//                       plus cross-attention over the encoder
//                       output; linear head to one scalar/step
//
// The decoder does not regress a raw value: target temperatures
// are effectively integer-valued, and hard rounding has zero
// gradient everywhere. The output stage instead applies smooth
// rounding — a sum of sigmoid windows that converges to
// nearest-integer rounding as the sharpness k grows while
// staying differentiable at finite k.

use burn::{
    nn::{
        attention::{generate_autoregressive_mask, MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
        PositionalEncoding, PositionalEncodingConfig,
    },
    prelude::*,
};

use crate::domain::schema::TIME_ENCODING_DIM;

/// Decoder query width: run-hour encoding + step time encoding.
const QUERY_DIM: usize = 2 * TIME_ENCODING_DIM;

/// Positional table capacity; both sequences here are far shorter.
const MAX_SEQ_LEN: usize = 512;

#[derive(Config, Debug)]
pub struct WeatherModelConfig {
    pub feature_dim: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub enc_layers:  usize,
    pub dec_layers:  usize,
    pub d_ff:        usize,
    pub dropout:     f64,
}

impl WeatherModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> WeatherModel<B> {
        WeatherModel {
            encoder: self.init_encoder(device),
            decoder: self.init_decoder(device),
        }
    }

    fn init_encoder<B: Backend>(&self, device: &B::Device) -> WeatherEncoder<B> {
        WeatherEncoder {
            input_proj: LinearConfig::new(self.feature_dim, self.d_model).init(device),
            pos_encoding: PositionalEncodingConfig::new(self.d_model)
                .with_max_sequence_size(MAX_SEQ_LEN)
                .init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            layers: (0..self.enc_layers).map(|_| self.init_encoder_block(device)).collect(),
            d_model: self.d_model,
        }
    }

    fn init_decoder<B: Backend>(&self, device: &B::Device) -> TemperatureDecoder<B> {
        TemperatureDecoder {
            input_proj: LinearConfig::new(QUERY_DIM, self.d_model).init(device),
            pos_encoding: PositionalEncodingConfig::new(self.d_model)
                .with_max_sequence_size(MAX_SEQ_LEN)
                .init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            layers: (0..self.dec_layers).map(|_| self.init_decoder_block(device)).collect(),
            output_proj: LinearConfig::new(self.d_model, 1).init(device),
            d_model: self.d_model,
        }
    }

    fn init_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        EncoderBlock {
            self_attn: MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
                .with_dropout(self.dropout)
                .init(device),
            ffn_linear1: LinearConfig::new(self.d_model, self.d_ff).init(device),
            ffn_linear2: LinearConfig::new(self.d_ff, self.d_model).init(device),
            norm1: LayerNormConfig::new(self.d_model).init(device),
            norm2: LayerNormConfig::new(self.d_model).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }

    fn init_decoder_block<B: Backend>(&self, device: &B::Device) -> DecoderBlock<B> {
        DecoderBlock {
            self_attn: MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
                .with_dropout(self.dropout)
                .init(device),
            cross_attn: MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
                .with_dropout(self.dropout)
                .init(device),
            ffn_linear1: LinearConfig::new(self.d_model, self.d_ff).init(device),
            ffn_linear2: LinearConfig::new(self.d_ff, self.d_model).init(device),
            norm1: LayerNormConfig::new(self.d_model).init(device),
            norm2: LayerNormConfig::new(self.d_model).init(device),
            norm3: LayerNormConfig::new(self.d_model).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

// ─── Encoder ──────────────────────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let attn_out = self.self_attn.forward(MhaInput::self_attn(x.clone())).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_out));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone())),
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

/// Self-attention stack over the H-hour NWP input sequence.
/// Output preserves the full sequence length — every hour gets a
/// contextualised representation for the decoder to attend over.
#[derive(Module, Debug)]
pub struct WeatherEncoder<B: Backend> {
    pub input_proj:   Linear<B>,
    pub pos_encoding: PositionalEncoding<B>,
    pub dropout:      Dropout,
    pub layers:       Vec<EncoderBlock<B>>,
    pub d_model:      usize,
}

impl<B: Backend> WeatherEncoder<B> {
    /// input: [batch, hours, features] → [batch, hours, d_model]
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        let x = self.input_proj.forward(input).mul_scalar((self.d_model as f32).sqrt());
        let x = self.pos_encoding.forward(x);
        let mut x = self.dropout.forward(x);
        for layer in &self.layers {
            x = layer.forward(x);
        }
        x
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct DecoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub cross_attn:  MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub norm3:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> DecoderBlock<B> {
    pub fn forward(
        &self,
        x: Tensor<B, 3>,
        memory: Tensor<B, 3>,
        causal_mask: Tensor<B, 3, Bool>,
    ) -> Tensor<B, 3> {
        // Masked self-attention: each forecast step attends only to
        // earlier steps during training
        let self_out = self
            .self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_attn(causal_mask))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(self_out));

        // Cross-attention: time queries attend to the weather history
        let cross_out = self
            .cross_attn
            .forward(MhaInput::new(x.clone(), memory.clone(), memory))
            .context;
        let x = self.norm2.forward(x + self.dropout.forward(cross_out));

        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone())),
        );
        self.norm3.forward(x + self.dropout.forward(ffn_out))
    }
}

/// Cross-attention decoder with the smooth-rounding output stage.
#[derive(Module, Debug)]
pub struct TemperatureDecoder<B: Backend> {
    pub input_proj:   Linear<B>,
    pub pos_encoding: PositionalEncoding<B>,
    pub dropout:      Dropout,
    pub layers:       Vec<DecoderBlock<B>>,
    pub output_proj:  Linear<B>,
    pub d_model:      usize,
}

impl<B: Backend> TemperatureDecoder<B> {
    /// memory:       [batch, hours, d_model] encoder output
    /// run_hour:     [batch, 2] run init-hour encoding
    /// target_times: [batch, steps, 2] per-step time encodings
    /// k:            smooth-rounding sharpness
    ///
    /// Returns temperatures of shape [batch, steps].
    pub fn forward(
        &self,
        memory: Tensor<B, 3>,
        run_hour: Tensor<B, 2>,
        target_times: Tensor<B, 3>,
        k: f32,
    ) -> Tensor<B, 2> {
        let [batch_size, steps, _] = target_times.dims();

        // Broadcast the run encoding to every forecast step and pair
        // it with that step's target time as the decoder query
        let run_expanded = run_hour
            .unsqueeze_dim::<3>(1)
            .expand([batch_size, steps, TIME_ENCODING_DIM]);
        let x = Tensor::cat(vec![run_expanded, target_times], 2);

        let x = self.input_proj.forward(x).mul_scalar((self.d_model as f32).sqrt());
        let x = self.pos_encoding.forward(x);
        let mut x = self.dropout.forward(x);

        let causal_mask = generate_autoregressive_mask::<B>(batch_size, steps, &x.device());
        for layer in &self.layers {
            x = layer.forward(x, memory.clone(), causal_mask.clone());
        }

        let temps = self.output_proj.forward(x).reshape([batch_size, steps]);
        smooth_round(temps, k)
    }
}

// ─── WeatherModel ─────────────────────────────────────────────────────────────

/// Full architecture. The halves couple only through the encoder
/// output, so each is independently testable given the other's
/// interface.
#[derive(Module, Debug)]
pub struct WeatherModel<B: Backend> {
    pub encoder: WeatherEncoder<B>,
    pub decoder: TemperatureDecoder<B>,
}

impl<B: Backend> WeatherModel<B> {
    pub fn forward(
        &self,
        run_hour: Tensor<B, 2>,
        input: Tensor<B, 3>,
        target_times: Tensor<B, 3>,
        k: f32,
    ) -> Tensor<B, 2> {
        let memory = self.encoder.forward(input);
        self.decoder.forward(memory, run_hour, target_times, k)
    }
}

// ─── Smooth rounding ──────────────────────────────────────────────────────────

/// Differentiable nearest-integer rounding.
///
/// For integer candidates n in a window of 5 around floor(x), sum
/// n · (σ(k(x−(n−0.5))) − σ(k(x−(n+0.5)))). Each sigmoid pair is a
/// soft indicator for "x rounds to n"; as k → ∞ the sum converges
/// to round(x), while finite k keeps a usable gradient.
pub fn smooth_round<B: Backend, const D: usize>(x: Tensor<B, D>, k: f32) -> Tensor<B, D> {
    use burn::tensor::activation::sigmoid;

    let x_floor = floor(x.clone());
    let mut result = x.zeros_like();

    for offset in -2..=2 {
        let n = x_floor.clone().add_scalar(offset as f32);
        let sig_left = sigmoid((x.clone() - n.clone().sub_scalar(0.5)).mul_scalar(k));
        let sig_right = sigmoid((x.clone() - n.clone().add_scalar(0.5)).mul_scalar(k));
        result = result + n * (sig_left - sig_right);
    }

    result
}

/// Elementwise floor. The int cast truncates toward zero, so step
/// negative non-integers down by one. Like a hard floor, this
/// contributes no gradient — the gradient path of smooth_round is
/// the sigmoids.
fn floor<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
    let trunc = x.clone().int().float();
    let stepped_down = x.lower(trunc.clone()).float();
    trunc - stepped_down
}
