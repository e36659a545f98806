use super::CnnConfig;
use crate::model::SubModel1;
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{
    conv::Conv2dConfig,
    conv2d, linear,
    sequential::{seq, Sequential},
    Module, VarBuilder,
};

/// Convolutional action-value function.
///
/// Takes a batch of stacked frames `[batch, n_stack, height, width]` with
/// values in `[0, 1]` and returns one value per action, `[batch, out_dim]`.
pub struct Cnn {
    device: Device,
    seq: Sequential,
}

impl Cnn {
    fn create_net(vb: &VarBuilder, config: &CnnConfig) -> Result<Sequential> {
        let mut net = seq();
        let mut in_channels = config.n_stack;
        for (i, c) in config.conv.iter().enumerate() {
            let conv_config = Conv2dConfig {
                padding: c.pad(),
                stride: c.stride,
                ..Default::default()
            };
            net = net
                .add(conv2d(
                    in_channels,
                    c.out_channels,
                    c.kernel,
                    conv_config,
                    vb.pp(format!("c{}", i)),
                )?)
                .add_fn(|xs| xs.relu());
            in_channels = c.out_channels;
        }
        net = net.add_fn(|xs| xs.flatten_from(1));

        let mut in_dim = config.flatten_dim()?;
        for (i, &n) in config.hidden.iter().enumerate() {
            net = net
                .add(linear(in_dim, n, vb.pp(format!("l{}", i)))?)
                .add_fn(|xs| xs.relu());
            in_dim = n;
        }
        let net = net.add(linear(in_dim, config.out_dim, vb.pp("out"))?);

        Ok(net)
    }
}

impl SubModel1 for Cnn {
    type Config = CnnConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, x: &Self::Input) -> Result<Tensor> {
        Ok(self.seq.forward(&x.to_device(&self.device)?)?)
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        config.validate()?;
        let device = vb.device().clone();
        let seq = Self::create_net(&vb, &config)?;
        Ok(Self { device, seq })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnn::{ConvLayerConfig, Padding};
    use candle_core::DType;
    use candle_nn::VarMap;

    #[test]
    fn test_forward_shape() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let config = CnnConfig::default()
            .n_stack(2)
            .in_shape((10, 7))
            .conv(vec![
                ConvLayerConfig::new(4, 3),
                ConvLayerConfig::new(4, 3).padding(Padding::Valid),
            ])
            .hidden(vec![8])
            .out_dim(3);
        let cnn = Cnn::build(vb, config)?;

        let x = Tensor::zeros((5, 2, 10, 7), DType::F32, &device)?;
        let y = cnn.forward(&x)?;
        assert_eq!(y.dims(), &[5, 3]);
        Ok(())
    }
}
