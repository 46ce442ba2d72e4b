// ============================================================
// Layer 5 — Training Loop
// ============================================================
// One fold = fresh model + fresh Adam, trained for `epochs` epochs.
//
// Per epoch:
//   lr    = schedule.lr_at(epoch)        (halved once at decay_epoch)
//   train: forward → NLL → backward → Adam step, for every batch
//   eval:  model.valid() on train and test loaders → accuracies
//
// Burn specifics:
//   - training runs on the Autodiff backend B
//   - model.valid() returns the model on B::InnerBackend, which
//     disables dropout and switches BatchNorm to running stats
//   - evaluation loaders are therefore built on B::InnerBackend
//
// A non-finite loss aborts the run with an error.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::Dataset,
    },
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::cross_validation_use_case::ExperimentConfig;
use crate::data::{batcher::{GraphBatch, GraphBatcher}, dataset::GraphDataset};
use crate::infra::metrics::EpochMetrics;
use crate::ml::classifier::{predict, GinClassifier, GinClassifierConfig};

// ─── Learning rate schedule ───────────────────────────────────────────────────
/// Constant rate with a single step decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LrSchedule {
    pub base_lr:     f64,
    /// First epoch (1-based) that runs at the decayed rate
    pub decay_epoch: usize,
    pub factor:      f64,
}

impl LrSchedule {
    pub fn lr_at(&self, epoch: usize) -> f64 {
        if epoch >= self.decay_epoch {
            self.base_lr * self.factor
        } else {
            self.base_lr
        }
    }
}

// ─── One epoch of training ────────────────────────────────────────────────────
/// Returns the updated model and the graph-weighted mean loss.
pub fn train_epoch<B, O>(
    mut model: GinClassifier<B>,
    optim:     &mut O,
    loader:    &dyn DataLoader<GraphBatch<B>>,
    lr:        f64,
) -> Result<(GinClassifier<B>, f64)>
where
    B: AutodiffBackend,
    O: Optimizer<GinClassifier<B>, B>,
{
    let mut loss_sum   = 0.0f64;
    let mut num_graphs = 0usize;

    for (i, batch) in loader.iter().enumerate() {
        let (loss, _) = model.forward_loss(&batch);

        let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
        if !loss_val.is_finite() {
            bail!("Training loss became {} at batch {}", loss_val, i + 1);
        }
        loss_sum   += loss_val * batch.num_graphs as f64;
        num_graphs += batch.num_graphs;
        tracing::debug!("batch {} loss={:.6}", i + 1, loss_val);

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(lr, model, grads);
    }

    let mean_loss = if num_graphs > 0 { loss_sum / num_graphs as f64 } else { 0.0 };
    Ok((model, mean_loss))
}

// ─── Evaluation ───────────────────────────────────────────────────────────────
/// Fraction of graphs whose arg-max class equals the label.
/// Empty loaders score 0.
pub fn evaluate<B: Backend>(model: &GinClassifier<B>, loader: &dyn DataLoader<GraphBatch<B>>) -> f64 {
    let mut correct = 0usize;
    let mut total   = 0usize;

    for batch in loader.iter() {
        let pred = predict(model.forward(&batch));
        let hits: i64 = pred
            .equal(batch.labels.clone())
            .int().sum().into_scalar().elem::<i64>();
        correct += hits as usize;
        total   += batch.num_graphs;
    }

    if total > 0 { correct as f64 / total as f64 } else { 0.0 }
}

// ─── Loaders ──────────────────────────────────────────────────────────────────
pub fn build_loader<B: Backend>(
    dataset:    GraphDataset,
    batch_size: usize,
    device:     &B::Device,
) -> std::sync::Arc<dyn DataLoader<GraphBatch<B>>> {
    DataLoaderBuilder::new(GraphBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .build(dataset)
}

// ─── One fold ─────────────────────────────────────────────────────────────────
/// Train a freshly initialised classifier on `train`, evaluating after
/// every epoch. `test` may be absent (full-dataset training), in which
/// case the reported test accuracy is NaN.
pub fn train_fold<B: AutodiffBackend>(
    cfg:       &ExperimentConfig,
    model_cfg: &GinClassifierConfig,
    fold:      usize,
    train:     GraphDataset,
    test:      Option<GraphDataset>,
    device:    &B::Device,
    on_epoch:  &mut dyn FnMut(&EpochMetrics) -> Result<()>,
) -> Result<GinClassifier<B>> {
    if let Some(seed) = cfg.seed {
        B::seed(seed.wrapping_add(fold as u64));
    }

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: GinClassifier<B> = model_cfg.init(device);
    tracing::info!(
        "Fold {}: model ready, {} GIN layers, hidden={}, {} train / {} test graphs",
        fold,
        model_cfg.encoder.num_layers,
        model_cfg.encoder.hidden,
        train.len(),
        test.as_ref().map(|t| t.len()).unwrap_or(0),
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new()
        .with_epsilon(1e-8)
        .init::<B, GinClassifier<B>>();

    // ── Loaders: autodiff for training, inner backend for evaluation ──────────
    let train_loader = build_loader::<B>(train.clone(), cfg.batch_size, device);
    let train_eval   = build_loader::<B::InnerBackend>(train, cfg.batch_size, device);
    let test_eval    = test.map(|t| build_loader::<B::InnerBackend>(t, cfg.batch_size, device));

    let schedule = cfg.lr_schedule();

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let lr = schedule.lr_at(epoch);
        if epoch == schedule.decay_epoch {
            tracing::info!("Fold {}: learning rate decayed to {}", fold, lr);
        }

        let (trained, train_loss) = train_epoch(model, &mut optim, train_loader.as_ref(), lr)
            .map_err(|e| e.context(format!("fold {fold}, epoch {epoch}")))?;
        model = trained;

        let model_valid = model.valid();
        let train_acc   = evaluate(&model_valid, train_eval.as_ref());
        let test_acc    = test_eval
            .as_ref()
            .map(|l| evaluate(&model_valid, l.as_ref()))
            .unwrap_or(f64::NAN);

        on_epoch(&EpochMetrics { fold, epoch, train_loss, train_acc, test_acc })?;
    }

    Ok(model)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    use crate::data::{dataset::prepare_graphs, synthetic::SyntheticGraphs};
    use crate::domain::{graph::Graph, traits::GraphSource};
    use crate::ml::encoder::GinEncoderConfig;

    type TestBackend = NdArray;
    type TestAutodiff = Autodiff<NdArray>;

    fn toy_dataset(n: usize) -> GraphDataset {
        let raw = SyntheticGraphs::new(n, 2).load_all().unwrap();
        GraphDataset::new(prepare_graphs(raw).unwrap().0)
    }

    fn nan_dataset() -> GraphDataset {
        GraphDataset::new(vec![
            Graph::new(2, 1, vec![f32::NAN, 1.0], vec![(0, 1), (1, 0)], 0),
            Graph::new(3, 1, vec![1.0; 3], vec![(0, 1), (1, 2)], 1),
        ])
    }

    fn toy_model_cfg() -> GinClassifierConfig {
        GinClassifierConfig::new(GinEncoderConfig::sum_readout(1, 8, 2), 2)
    }

    #[test]
    fn test_lr_halves_exactly_at_decay_epoch() {
        let s = LrSchedule { base_lr: 0.001, decay_epoch: 51, factor: 0.5 };
        assert_eq!(s.lr_at(51), s.lr_at(50) / 2.0);
        for epoch in 1..200 {
            if epoch + 1 != 51 {
                assert_eq!(s.lr_at(epoch), s.lr_at(epoch + 1), "changed after epoch {epoch}");
            }
        }
        assert_eq!(s.lr_at(1), 0.001);
        assert_eq!(s.lr_at(100), 0.0005);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let device = Default::default();
        let model: GinClassifier<TestBackend> = toy_model_cfg().init(&device);
        let loader = build_loader::<TestBackend>(toy_dataset(12), 5, &device);

        let first  = evaluate(&model, loader.as_ref());
        let second = evaluate(&model, loader.as_ref());
        assert_eq!(first, second);
        assert!((0.0..=1.0).contains(&first));
    }

    #[test]
    fn test_empty_loader_scores_zero() {
        let device = Default::default();
        let model: GinClassifier<TestBackend> = toy_model_cfg().init(&device);
        let loader = build_loader::<TestBackend>(GraphDataset::new(vec![]), 4, &device);
        assert_eq!(evaluate(&model, loader.as_ref()), 0.0);
    }

    #[test]
    fn test_train_epoch_reports_finite_loss() {
        let device = Default::default();
        let model: GinClassifier<TestAutodiff> = toy_model_cfg().init(&device);
        let mut optim = AdamConfig::new().init::<TestAutodiff, GinClassifier<TestAutodiff>>();
        let loader = build_loader::<TestAutodiff>(toy_dataset(10), 4, &device);

        let (_, loss) = train_epoch(model, &mut optim, loader.as_ref(), 1e-3).unwrap();
        assert!(loss.is_finite() && loss > 0.0);
    }

    #[test]
    fn test_train_fold_reports_every_epoch() {
        let device = Default::default();
        let cfg = ExperimentConfig { epochs: 3, batch_size: 4, seed: Some(1), ..Default::default() };

        let mut seen = Vec::new();
        train_fold::<TestAutodiff>(
            &cfg,
            &toy_model_cfg(),
            1,
            toy_dataset(8),
            Some(toy_dataset(4)),
            &device,
            &mut |m: &EpochMetrics| { seen.push(*m); Ok(()) },
        ).unwrap();

        assert_eq!(seen.iter().map(|m| m.epoch).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(seen.iter().all(|m| (0.0..=1.0).contains(&m.test_acc)));
    }

    #[test]
    fn test_nan_loss_is_an_error() {
        let device = Default::default();
        let model: GinClassifier<TestAutodiff> = toy_model_cfg().init(&device);
        let mut optim = AdamConfig::new().init::<TestAutodiff, GinClassifier<TestAutodiff>>();
        let loader = build_loader::<TestAutodiff>(nan_dataset(), 2, &device);

        let err = train_epoch(model, &mut optim, loader.as_ref(), 1e-3).unwrap_err();
        assert!(err.to_string().contains("batch 1"));
    }

    #[test]
    fn test_train_fold_error_names_fold_and_epoch() {
        let device = Default::default();
        let cfg = ExperimentConfig { epochs: 2, batch_size: 2, seed: Some(3), ..Default::default() };

        let mut calls = 0;
        let err = train_fold::<TestAutodiff>(
            &cfg,
            &toy_model_cfg(),
            4,
            nan_dataset(),
            None,
            &device,
            &mut |_: &EpochMetrics| { calls += 1; Ok(()) },
        ).unwrap_err();

        let text = format!("{err:#}");
        assert!(text.contains("fold 4"), "{text}");
        assert!(text.contains("epoch 1"), "{text}");
        assert_eq!(calls, 0);
    }
}
