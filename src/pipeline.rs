//! Per-item alignment and the batch driver.
//!
//! [`Aligner`] wires the three stages together: feature extraction for the
//! recording and its synthesized rendition, DTW between the two
//! spectrograms, and projection of the note list through the warp path.
//! [`Aligner::run_batch`] repeats that over a manifest, isolating each row's
//! failure so one bad file never stops the rest.

use crate::dtw::{Alignment, AlignmentEngine};
use crate::feature::{FeatureExtractor, Spectrogram};
use crate::io::{self, Waveform};
use crate::manifest::{DatasetLayout, Item};
use crate::mapping::{TickScale, TimeMapper};
use crate::notes::{self, AlignedNote, Note};
use crate::AlignConfig;
use log::{debug, info, warn};

/// Everything computed while aligning one recording.
#[derive(Debug, Clone)]
pub struct AlignedScore {
    pub real: Spectrogram,
    pub synth: Spectrogram,
    pub alignment: Alignment,
    pub notes: Vec<AlignedNote>,
}

/// Summary of one aligned manifest row.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub real_frames: usize,
    pub synth_frames: usize,
    pub path_len: usize,
    pub cost: f64,
    pub n_notes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus {
    Aligned(ItemReport),
    /// Output already existed and `skip_existing` was set.
    Skipped,
}

/// The result of one manifest row.
#[derive(Debug)]
pub struct ItemOutcome {
    pub item: Item,
    pub result: crate::Result<ItemStatus>,
}

impl ItemOutcome {
    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

/// Outcomes of a batch, in manifest order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn aligned(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(ItemStatus::Aligned(_))))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(ItemStatus::Skipped)))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Batch behaviour that does not affect the alignment itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Leave rows whose aligned-notes CSV already exists untouched.
    pub skip_existing: bool,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_existing(mut self, skip_existing: bool) -> Self {
        self.skip_existing = skip_existing;
        self
    }
}

/// Score-to-recording aligner built from one validated [`AlignConfig`].
#[derive(Debug, Clone)]
pub struct Aligner {
    config: AlignConfig,
    extractor: FeatureExtractor,
    engine: AlignmentEngine,
}

impl Aligner {
    /// # Errors
    /// Any error reported by [`AlignConfig::validate`].
    pub fn new(config: AlignConfig) -> crate::Result<Self> {
        config.validate()?;
        debug!(
            "{} bins from {} ({} per octave), hop {}",
            config.n_bins(),
            config.base_note(),
            config.bins_per_octave(),
            config.hop_length
        );
        Ok(Self {
            extractor: FeatureExtractor::new(&config),
            engine: AlignmentEngine::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Align in-memory audio and notes.
    ///
    /// `real` is the performance, `synth` the rendition of `notes` at a
    /// constant tempo. Both must share a sample rate.
    ///
    /// # Errors
    /// `SampleRateMismatch` and `NoNotes` are reported before any spectrogram
    /// is computed. Feature, DTW and `ZeroDuration` errors follow.
    pub fn align(&self, real: &Waveform, synth: &Waveform, notes: &[Note]) -> crate::Result<AlignedScore> {
        let mapper = TimeMapper::new(self.config.hop_length, real.sample_rate(), synth.sample_rate())?;
        if notes.is_empty() {
            return Err(crate::Error::NoNotes);
        }

        let (alignment, real, synth) = self.warp(real, synth)?;
        let scale = TickScale::from_notes(notes, synth.n_frames())?;
        let notes = mapper.map_notes(&alignment.path, notes, &scale);

        Ok(AlignedScore {
            real,
            synth,
            alignment,
            notes,
        })
    }

    fn warp(&self, real: &Waveform, synth: &Waveform) -> crate::Result<(Alignment, Spectrogram, Spectrogram)> {
        let real = self.extractor.extract(real)?;
        let synth = self.extractor.extract(synth)?;
        let alignment = self.engine.align(&real, &synth)?;
        Ok((alignment, real, synth))
    }

    /// Align one manifest row and write its outputs.
    ///
    /// The warp path is saved before the note list is read, so a row with a
    /// broken note file still leaves its `.npy` behind.
    pub fn align_item(
        &self,
        item: &Item,
        layout: &DatasetLayout,
        options: BatchOptions,
    ) -> crate::Result<ItemStatus> {
        let out_csv = layout.aligned_notes(item);
        if options.skip_existing && out_csv.is_file() {
            debug!("{item}: output exists, skipping");
            return Ok(ItemStatus::Skipped);
        }

        let real = io::load(layout.recording(item), self.config.sample_rate)?;
        let synth = io::load(layout.synthesized(item), self.config.sample_rate)?;
        let mapper = TimeMapper::new(self.config.hop_length, real.sample_rate(), synth.sample_rate())?;

        let (alignment, real_spec, synth_spec) = self.warp(&real, &synth)?;
        std::fs::create_dir_all(layout.alignment_dir(item))?;
        alignment.path.save_npy(layout.warp_path(item))?;

        let note_list = notes::read_notes(layout.notes(item))?;
        let scale = TickScale::from_notes(&note_list, synth_spec.n_frames())?;
        let aligned = mapper.map_notes(&alignment.path, &note_list, &scale);
        notes::write_aligned(&out_csv, &aligned)?;

        debug!(
            "{item}: {} notes over {} recording frames ({:.2} s)",
            aligned.len(),
            real_spec.n_frames(),
            real_spec.duration()
        );
        Ok(ItemStatus::Aligned(ItemReport {
            real_frames: real_spec.n_frames(),
            synth_frames: synth_spec.n_frames(),
            path_len: alignment.path.len(),
            cost: alignment.cost,
            n_notes: aligned.len(),
        }))
    }

    fn run_item(&self, item: &Item, layout: &DatasetLayout, options: BatchOptions) -> ItemOutcome {
        let result = self.align_item(item, layout, options);
        if let Err(err) = &result {
            warn!("{item}: {err}");
        }
        ItemOutcome {
            item: item.clone(),
            result,
        }
    }

    /// Align every row, calling `on_item` as each one finishes.
    ///
    /// With the `parallel` feature rows run on the current rayon pool and
    /// `on_item` may be called from several threads; outcomes are still
    /// returned in manifest order.
    pub fn run_batch<F>(
        &self,
        items: &[Item],
        layout: &DatasetLayout,
        options: BatchOptions,
        on_item: F,
    ) -> BatchReport
    where
        F: Fn(&ItemOutcome) + Sync,
    {
        info!("aligning {} items", items.len());
        let run = |item: &Item| {
            let outcome = self.run_item(item, layout, options);
            on_item(&outcome);
            outcome
        };

        let outcomes: Vec<ItemOutcome> = {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                items.par_iter().map(run).collect()
            }
            #[cfg(not(feature = "parallel"))]
            {
                items.iter().map(run).collect()
            }
        };

        let report = BatchReport { outcomes };
        info!(
            "aligned {}, skipped {}, failed {}",
            report.aligned(),
            report.skipped(),
            report.failed()
        );
        report
    }
}
