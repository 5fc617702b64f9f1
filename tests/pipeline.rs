//! Batch alignment over a dataset laid out on disk.

use score_align::dtw::WarpPath;
use score_align::io::{self, Waveform};
use score_align::manifest::{self, DatasetLayout, Item};
use score_align::notes;
use score_align::pipeline::{BatchOptions, ItemStatus};
use score_align::{AlignConfig, Aligner};
use std::path::Path;
use std::sync::Mutex;

const NOTES: &str = "onset,offset,pitch,velocity\n0,4,60,90\n4,8,67,90\n8,12,64,90\n";

fn melody(sr: u32, note_len: f32) -> Waveform {
    let samples = [261.63, 392.0, 329.63]
        .iter()
        .flat_map(|&f| io::tone(f, sr, note_len))
        .map(|s| s * 0.4)
        .collect();
    Waveform::new(samples, sr)
}

fn write(path: &Path, contents: impl FnOnce(&Path)) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    contents(path);
}

fn populate(layout: &DatasetLayout, item: &Item, real_sr: u32, synth_sr: u32) {
    write(&layout.recording(item), |p| {
        io::save_wav(p, &melody(real_sr, 0.4)).unwrap()
    });
    write(&layout.synthesized(item), |p| {
        io::save_wav(p, &melody(synth_sr, 0.3)).unwrap()
    });
    write(&layout.notes(item), |p| std::fs::write(p, NOTES).unwrap());
}

fn config() -> AlignConfig {
    AlignConfig::new().with_hop_length(256).with_bins_per_semitone(1)
}

#[test]
fn batch_from_manifest_writes_every_output() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DatasetLayout::new(dir.path().join("data"), dir.path().join("out"));
    let manifest_path = dir.path().join("manifest.csv");
    std::fs::write(
        &manifest_path,
        "filename,collection,title\nfirst,etudes,One\nsecond,etudes,Two\n",
    )
    .unwrap();

    let items = manifest::read_manifest(&manifest_path).unwrap();
    assert_eq!(items, vec![Item::new("etudes", "first"), Item::new("etudes", "second")]);
    for item in &items {
        populate(&layout, item, 8000, 8000);
    }

    let aligner = Aligner::new(config()).unwrap();
    let finished = Mutex::new(Vec::new());
    let report = aligner.run_batch(&items, &layout, BatchOptions::new(), |outcome| {
        finished.lock().unwrap().push(outcome.item.clone());
    });

    assert!(report.is_success());
    assert_eq!(report.aligned(), 2);
    assert_eq!(finished.into_inner().unwrap().len(), 2);

    for item in &items {
        let aligned = notes::read_aligned(layout.aligned_notes(item)).unwrap();
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned[0].start, 0.0);
        for w in aligned.windows(2) {
            assert!(w[1].start >= w[0].start);
        }

        let path = WarpPath::load_npy(layout.warp_path(item)).unwrap();
        assert_eq!(path.get(0), Some((0, 0)));
    }

    let text = std::fs::read_to_string(layout.aligned_notes(&items[0])).unwrap();
    assert!(text.starts_with("start,end\n"));
}

#[test]
fn one_broken_row_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DatasetLayout::new(dir.path().join("data"), dir.path().join("out"));
    let good = Item::new("set", "good");
    let mismatched = Item::new("set", "mismatched");
    let absent = Item::new("set", "absent");
    populate(&layout, &good, 8000, 8000);
    populate(&layout, &mismatched, 8000, 16000);

    let aligner = Aligner::new(config()).unwrap();
    let items = [absent.clone(), good.clone(), mismatched.clone()];
    let report = aligner.run_batch(&items, &layout, BatchOptions::new(), |_| {});

    assert_eq!(report.aligned(), 1);
    assert_eq!(report.failed(), 2);
    let failed: Vec<&Item> = report.failures().map(|o| &o.item).collect();
    assert_eq!(failed, vec![&absent, &mismatched]);
    assert!(matches!(
        report.outcomes[2].result,
        Err(score_align::Error::SampleRateMismatch { real: 8000, synth: 16000 })
    ));
    assert!(layout.aligned_notes(&good).is_file());
}

#[test]
fn resampling_reconciles_sample_rates() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DatasetLayout::new(dir.path().join("data"), dir.path().join("out"));
    let item = Item::new("set", "mixed_rates");
    populate(&layout, &item, 8000, 16000);

    let aligner = Aligner::new(config().with_sample_rate(8000)).unwrap();
    let status = aligner.align_item(&item, &layout, BatchOptions::new()).unwrap();
    let ItemStatus::Aligned(report) = status else {
        panic!("expected the item to be aligned");
    };
    assert_eq!(report.n_notes, 3);
    // 1.2 s at 8 kHz with a 256-sample hop.
    assert_eq!(report.real_frames, 9600 / 256 + 1);
}

#[test]
fn skip_existing_leaves_outputs_alone() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DatasetLayout::new(dir.path().join("data"), dir.path().join("out"));
    let item = Item::new("set", "done");
    populate(&layout, &item, 8000, 8000);
    write(&layout.aligned_notes(&item), |p| {
        std::fs::write(p, "start,end\n").unwrap()
    });

    let aligner = Aligner::new(config()).unwrap();
    let options = BatchOptions::new().with_skip_existing(true);
    let report = aligner.run_batch(std::slice::from_ref(&item), &layout, options, |_| {});

    assert_eq!(report.skipped(), 1);
    assert!(!layout.warp_path(&item).exists());
    assert_eq!(
        std::fs::read_to_string(layout.aligned_notes(&item)).unwrap(),
        "start,end\n"
    );
}
