use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::CrossEntropyLossConfig,
        BatchNorm, BatchNormConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
        PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::{relu, softmax},
};

use crate::domain::sample::{CHANNELS, NUM_CLASSES, WINDOW_LEN};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct MotionCnnConfig {
    #[config(default = "WINDOW_LEN")]
    pub window_len:  usize,
    #[config(default = "CHANNELS")]
    pub channels:    usize,
    #[config(default = "NUM_CLASSES")]
    pub num_classes: usize,
    #[config(default = 8)]
    pub filters_1:   usize,
    #[config(default = 16)]
    pub filters_2:   usize,
    #[config(default = 5)]
    pub kernel_size: usize,
    #[config(default = 16)]
    pub hidden:      usize,
}

impl MotionCnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> MotionCnn<B> {
        let k = [self.kernel_size, self.kernel_size];

        // Normalises each channel across the time axis
        let input_norm = LayerNormConfig::new(self.window_len).init(device);

        let conv1 = Conv2dConfig::new([1, self.filters_1], k)
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        let norm1 = BatchNormConfig::new(self.filters_1).init(device);

        let conv2 = Conv2dConfig::new([self.filters_1, self.filters_2], k)
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        let norm2 = BatchNormConfig::new(self.filters_2).init(device);

        let flat_len = self.flattened_len();
        let fc1   = LinearConfig::new(flat_len, self.hidden).init(device);
        let norm3 = BatchNormConfig::new(self.hidden).init(device);
        let head  = LinearConfig::new(self.hidden, self.num_classes).init(device);

        MotionCnn {
            input_norm,
            conv1, norm1,
            conv2, norm2,
            fc1, norm3, head,
        }
    }

    /// Features left after the two conv blocks: 16 * 32 * 1 for 128x3 input.
    pub fn flattened_len(&self) -> usize {
        let h = pooled_len(pooled_len(self.window_len));
        let w = pooled_len(pooled_len(self.channels));
        self.filters_2 * h * w
    }
}

/// Output length of a 2-wide, stride-2 "same" pool.
fn pooled_len(len: usize) -> usize {
    len.div_ceil(2)
}

/// 2x2 stride-2 "same" max pool over the last two axes of [N, C, H, W].
///
/// An odd axis gets one padding cell at its trailing edge only, so a
/// 3-wide axis pools as [c0, c1], [c2]. Padding is -inf and never wins.
fn same_max_pool<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    let x = pad_trailing(pad_trailing(x, 2), 3);
    let [n, c, h, w] = x.dims();

    x.reshape([n, c, h / 2, 2, w / 2, 2])
        .max_dim(5)
        .max_dim(3)
        .reshape([n, c, h / 2, w / 2])
}

fn pad_trailing<B: Backend>(x: Tensor<B, 4>, dim: usize) -> Tensor<B, 4> {
    let mut shape = x.dims();
    if shape[dim] % 2 == 0 {
        return x;
    }
    shape[dim] = 1;
    let fill = Tensor::full(shape, f32::NEG_INFINITY, &x.device());
    Tensor::cat(vec![x, fill], dim)
}

#[derive(Module, Debug)]
pub struct MotionCnn<B: Backend> {
    pub input_norm: LayerNorm<B>,
    pub conv1:      Conv2d<B>,
    pub norm1:      BatchNorm<B, 2>,
    pub conv2:      Conv2d<B>,
    pub norm2:      BatchNorm<B, 2>,
    pub fc1:        Linear<B>,
    pub norm3:      BatchNorm<B, 0>,
    pub head:       Linear<B>,
}

impl<B: Backend> MotionCnn<B> {
    /// inputs: [batch, 1, window, channels] → logits: [batch, classes]
    pub fn forward(&self, inputs: Tensor<B, 4>) -> Tensor<B, 2> {
        // LayerNorm works on the last axis, so move time there and back.
        let x = self.input_norm.forward(inputs.swap_dims(2, 3)).swap_dims(2, 3);

        let x = relu(self.norm1.forward(self.conv1.forward(x)));
        let x = same_max_pool(x);

        let x = self.norm2.forward(relu(self.conv2.forward(x)));
        let x = same_max_pool(x); // [batch, 16, 32, 1]

        let x = x.flatten::<2>(1, 3);
        let x = self.norm3.forward(relu(self.fc1.forward(x)));

        self.head.forward(x)
    }

    /// Class probabilities: softmax over the logits.
    pub fn probabilities(&self, inputs: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(inputs), 1)
    }

    /// Mean cross-entropy of the logits against integer class ids.
    pub fn forward_loss(
        &self,
        inputs:  Tensor<B, 4>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(inputs);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);
        (loss, logits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::{AdamConfig, GradientsParams, Optimizer};

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_flattened_len_matches_reference_architecture() {
        assert_eq!(MotionCnnConfig::new().flattened_len(), 512);
        assert_eq!(pooled_len(3), 2);
        assert_eq!(pooled_len(2), 1);
        assert_eq!(pooled_len(128), 64);
    }

    #[test]
    fn test_pool_pads_trailing_edge_only() {
        let device = Default::default();
        // rows [1, 5, 2] and [3, 4, 9]: columns pool as {0, 1} and {2}
        let x = Tensor::<NdArray<f32>, 1>::from_floats([1.0, 5.0, 2.0, 3.0, 4.0, 9.0], &device)
            .reshape([1, 1, 2, 3]);
        let pooled = same_max_pool(x);
        assert_eq!(pooled.dims(), [1, 1, 1, 2]);
        assert_eq!(pooled.into_data().to_vec::<f32>().unwrap(), vec![5.0, 9.0]);
    }

    #[test]
    fn test_pool_padding_never_wins() {
        let device = Default::default();
        let x = Tensor::<NdArray<f32>, 1>::from_floats([-1.0, -5.0, -2.0, -3.0, -4.0, -9.0], &device)
            .reshape([1, 1, 2, 3]);
        let pooled = same_max_pool(x).into_data().to_vec::<f32>().unwrap();
        assert_eq!(pooled, vec![-1.0, -2.0]);
    }

    #[test]
    fn test_backward_and_optimizer_step() {
        let device = Default::default();
        let model: MotionCnn<TestBackend> = MotionCnnConfig::new().init(&device);
        let inputs = Tensor::<TestBackend, 4>::random(
            [2, 1, WINDOW_LEN, CHANNELS],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 1], &device);

        let (loss, _) = model.forward_loss(inputs.clone(), targets);
        let grads = GradientsParams::from_grads(loss.backward(), &model);
        let before = model.head.weight.val().into_data().to_vec::<f32>().unwrap();

        let mut optim = AdamConfig::new().init();
        let model = optim.step(1e-2, model, grads);
        let after = model.head.weight.val().into_data().to_vec::<f32>().unwrap();

        assert_ne!(before, after);
        assert_eq!(model.forward(inputs).dims(), [2, NUM_CLASSES]);
    }

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let model: MotionCnn<TestBackend> = MotionCnnConfig::new().init(&device);

        let inputs = Tensor::<TestBackend, 4>::random(
            [5, 1, WINDOW_LEN, CHANNELS],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        assert_eq!(model.forward(inputs.clone()).dims(), [5, NUM_CLASSES]);

        let probs = model.probabilities(inputs).sum_dim(1).into_data().to_vec::<f32>().unwrap();
        for p in probs {
            assert!((p - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_loss_is_finite_scalar() {
        let device = Default::default();
        let model: MotionCnn<TestBackend> = MotionCnnConfig::new().init(&device);
        let inputs = Tensor::<TestBackend, 4>::ones([3, 1, WINDOW_LEN, CHANNELS], &device);
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 1, 2], &device);

        let (loss, logits) = model.forward_loss(inputs, targets);
        assert_eq!(logits.dims(), [3, NUM_CLASSES]);
        let value: f32 = loss.into_scalar().elem();
        assert!(value.is_finite());
    }
}
