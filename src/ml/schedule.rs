// ============================================================
// Layer 5 — Training Discipline
// ============================================================
// Three small state machines the trainer steps once per epoch:
//
//   - the smooth-rounding sharpness ramp
//   - the reduce-on-plateau learning-rate schedule
//   - early stopping with the best-snapshot policy
//
// They are kept free of tensors and backends so the epoch-level
// control flow — exactly when the LR halves, exactly which
// epoch training halts at — is testable with plain numbers.

/// Sharpness used for validation and evaluation forward passes:
/// a fixed middle-ground between the ramp's endpoints.
pub const EVAL_SMOOTH_K: f32 = 15.0;

/// Gradient-norm ceiling applied inside the optimizer.
pub const GRAD_CLIP_NORM: f32 = 1.0;

/// Smooth-rounding sharpness for training epoch `epoch` (0-based):
/// linear ramp 5 → 20, reaching 20 halfway through the epoch
/// budget — before typical early stopping kicks in.
pub fn training_smooth_k(epoch: usize, max_epochs: usize) -> f32 {
    let target_epoch = (max_epochs / 2).max(1);
    let progress = (epoch as f32 / target_epoch as f32).min(1.0);
    5.0 + progress * 15.0
}

// ─── Reduce-on-plateau learning rate ─────────────────────────────────────────

/// Halves the learning rate after `patience` consecutive epochs
/// without a validation improvement, floored at `min_lr`.
pub struct PlateauScheduler {
    lr: f64,
    factor: f64,
    patience: usize,
    min_lr: f64,
    best_loss: f64,
    stall: usize,
}

impl PlateauScheduler {
    pub fn new(initial_lr: f64, factor: f64, patience: usize, min_lr: f64) -> Self {
        Self {
            lr: initial_lr,
            factor,
            patience,
            min_lr,
            best_loss: f64::INFINITY,
            stall: 0,
        }
    }

    /// Current learning rate, used for every optimizer step this epoch.
    pub fn lr(&self) -> f64 {
        self.lr
    }

    /// Record this epoch's validation loss; returns the rate for
    /// the next epoch.
    pub fn step(&mut self, val_loss: f64) -> f64 {
        if val_loss < self.best_loss {
            self.best_loss = val_loss;
            self.stall = 0;
        } else {
            self.stall += 1;
            if self.stall >= self.patience {
                let reduced = (self.lr * self.factor).max(self.min_lr);
                if reduced < self.lr {
                    tracing::info!("Plateau: reducing learning rate {} → {}", self.lr, reduced);
                }
                self.lr = reduced;
                self.stall = 0;
            }
        }
        self.lr
    }
}

// ─── Early stopping ──────────────────────────────────────────────────────────

/// Verdict for one validation epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// New best validation loss — snapshot the parameters now
    Improved,
    /// No improvement, keep training
    NotImproved,
    /// Stall counter reached patience — halt and restore the snapshot
    Stop,
}

/// Tracks the best validation loss and a stall counter. The
/// trainer snapshots parameters on Improved and restores that
/// snapshot on Stop — deployed parameters are best-seen, never
/// merely latest.
pub struct EarlyStopping {
    patience: usize,
    best_loss: f64,
    stall: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self { patience, best_loss: f64::INFINITY, stall: 0 }
    }

    pub fn observe(&mut self, val_loss: f64) -> Verdict {
        if val_loss < self.best_loss {
            self.best_loss = val_loss;
            self.stall = 0;
            Verdict::Improved
        } else {
            self.stall += 1;
            if self.stall >= self.patience {
                Verdict::Stop
            } else {
                Verdict::NotImproved
            }
        }
    }

    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    pub fn stall(&self) -> usize {
        self.stall
    }
}
