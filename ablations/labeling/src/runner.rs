//! 程序运行函数.

use crate::profile::Profile;
use crate::result::AblationResult;
use mask_berry::consts::gray::{is_foreground, is_organ};
use mask_berry::prelude::*;
use utils::phantom::kidney_phantom;

/// 参与实验的合成体数据形状 (z, h, w) 和假阳性碎块个数.
const PHANTOMS: [((usize, usize, usize), usize); 4] = [
    ((32, 64, 64), 4),
    ((64, 128, 128), 8),
    ((96, 192, 192), 16),
    ((128, 256, 256), 24),
];

/// 实际运行. 串行和并行结果不一致时 panic.
pub fn run() -> AblationResult {
    let config = PostProcessConfig::new(1000, true);
    let mut serial = Profile::new();
    let mut parallel = Profile::new();
    let mut serial_pipeline = Profile::new();
    let mut parallel_pipeline = Profile::new();

    println!("Running ablation studies on {} threads...", rayon::current_num_threads());
    for (shape, specks) in PHANTOMS {
        let v = kidney_phantom(shape, specks);
        log::info!("phantom {shape:?}: {:?}", v.numeric_statistics());

        for pred in [is_organ, is_foreground] {
            let a = serial.measure(v.size(), || label_where(v.data(), pred));
            let b = parallel.measure(v.size(), || par_label_where(v.data(), pred));
            assert_eq!(a, b, "labeling mismatch on {shape:?}");
            serial.count_components(a.len());
            parallel.count_components(b.len());
        }

        let a = serial_pipeline.measure(v.size(), || process_with_report(&v, &config));
        let b = parallel_pipeline.measure(v.size(), || par_process_with_report(&v, &config));
        assert_eq!(a, b, "pipeline mismatch on {shape:?}");
        serial_pipeline.count_components(a.1.organ.kept.len());
        parallel_pipeline.count_components(b.1.organ.kept.len());
    }

    AblationResult::from_iter([
        ("label (serial)", serial),
        ("label (rayon)", parallel),
        ("pipeline (serial)", serial_pipeline),
        ("pipeline (rayon)", parallel_pipeline),
    ])
}
