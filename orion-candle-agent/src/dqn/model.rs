use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::{clamp_grads, copy_vars, load_vars, OutDim},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`DqnModel`].
pub struct DqnModelConfig<Q>
where
    Q: OutDim,
{
    /// Configuration of the action-value function.
    pub q_config: Option<Q>,

    /// Configuration of the optimizer.
    pub opt_config: OptimizerConfig,
}

impl<Q> Default for DqnModelConfig<Q>
where
    Q: OutDim,
{
    fn default() -> Self {
        Self {
            q_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<Q> DqnModelConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets configurations for action-value function.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets output dimension of the model.
    pub fn out_dim(mut self, v: usize) -> Self {
        match &mut self.q_config {
            None => {}
            Some(q_config) => q_config.set_out_dim(v),
        };
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`DqnModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnModelConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// An action-value function with its own parameters and optimizer.
pub struct DqnModel<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim,
{
    varmap: VarMap,

    // Number of actions.
    out_dim: usize,

    // Action-value function
    q: Q,

    opt: Optimizer,

    device: Device,
}

impl<Q> DqnModel<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs [`DqnModel`] with freshly initialized parameters.
    pub fn build(config: DqnModelConfig<Q::Config>, device: &Device) -> Result<Self> {
        let q_config = config.q_config.context("q_config is not set.")?;
        let out_dim = q_config.get_out_dim();
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
            Q::build(vb, q_config)?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            varmap,
            out_dim,
            q,
            opt,
            device: device.clone(),
        })
    }

    /// Outputs the action-values given a batch of states.
    pub fn forward(&self, xs: &Q::Input) -> Result<Tensor> {
        self.q.forward(xs)
    }

    /// The number of actions.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// The trainable parameters.
    pub fn vars(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }

    /// Backpropagates `loss`, clamps the gradients elementwise to `clamp` if
    /// given, and applies an optimizer step.
    ///
    /// Gradients are not accumulated across calls.
    pub fn backward_step(&mut self, loss: &Tensor, clamp: Option<(f32, f32)>) -> Result<()> {
        let mut grads = loss.backward()?;
        if let Some((min, max)) = clamp {
            clamp_grads(&mut grads, &self.vars(), min, max)?;
        }
        self.opt.step(&grads)
    }

    /// Overwrites the parameters with a copy of the parameters of `src`.
    pub fn copy_from(&mut self, src: &Self) -> Result<()> {
        copy_vars(&self.varmap, &src.varmap)
    }

    /// The variable map holding the parameters.
    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves the parameters in safetensors format.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Saved action-value parameters to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the parameters saved by [`DqnModel::save`].
    ///
    /// The parameters are unchanged if the file does not match the network.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        load_vars(&self.varmap, &path, &self.device)?;
        info!("Loaded action-value parameters from {:?}", path.as_ref());
        Ok(())
    }
}
