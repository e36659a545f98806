//! Utilities.
use anyhow::{anyhow, Result};
use candle_core::{backprop::GradStore, Device, Var};
use candle_nn::VarMap;
use log::trace;
use orion_core::error::OrionError;
use std::{collections::HashMap, path::Path};

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> usize;

    /// Sets the  output dimension.
    fn set_out_dim(&mut self, v: usize);
}

/// Clamps the gradient of every variable elementwise to `[min, max]`.
pub fn clamp_grads(grads: &mut GradStore, vars: &[Var], min: f32, max: f32) -> Result<()> {
    for var in vars {
        if let Some(g) = grads.get(var.as_tensor()) {
            let clamped = g.clamp(min, max)?;
            grads.insert(var.as_tensor(), clamped);
        }
    }
    Ok(())
}

/// Copies the values of the variables of `src` into the variables of `dest`.
///
/// Variables are identified by their names. The values are copied, so later
/// updates of `src` do not affect `dest`.
pub fn copy_vars(dest: &VarMap, src: &VarMap) -> Result<()> {
    trace!("dest");
    let dest = dest
        .data()
        .lock()
        .map_err(|_| anyhow!("Failed to lock the destination varmap"))?;
    trace!("src");
    let src = src
        .data()
        .lock()
        .map_err(|_| anyhow!("Failed to lock the source varmap"))?;

    for (name, v_dest) in dest.iter() {
        let v_src = src
            .get(name)
            .ok_or_else(|| anyhow!("Missing variable {} in the source varmap", name))?;
        v_dest.set(&v_src.as_tensor().detach())?;
    }

    Ok(())
}

/// Loads the variables of `dest` from a safetensors file.
///
/// Every variable must be present in the file with the same shape. The file
/// is checked as a whole before any variable is written, so `dest` is left
/// untouched when loading fails.
pub fn load_vars(dest: &VarMap, path: impl AsRef<Path>, device: &Device) -> Result<()> {
    let mut tensors = candle_core::safetensors::load(path.as_ref(), device)?;
    let dest = dest
        .data()
        .lock()
        .map_err(|_| anyhow!("Failed to lock the destination varmap"))?;

    let mut values = HashMap::with_capacity(dest.len());
    for (name, var) in dest.iter() {
        let t = tensors.remove(name).ok_or_else(|| {
            OrionError::ShapeMismatch(format!("{} is missing in {:?}", name, path.as_ref()))
        })?;
        if t.shape() != var.shape() {
            return Err(OrionError::ShapeMismatch(format!(
                "{} has shape {:?} in {:?}, expected {:?}",
                name,
                t.shape(),
                path.as_ref(),
                var.shape()
            ))
            .into());
        }
        values.insert(name, t.to_dtype(var.dtype())?);
    }

    for (name, var) in dest.iter() {
        if let Some(t) = values.get(name) {
            var.set(t)?;
        }
    }
    Ok(())
}
