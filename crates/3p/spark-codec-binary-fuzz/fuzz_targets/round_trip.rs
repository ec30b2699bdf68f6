#![no_main]

use libfuzzer_sys::fuzz_target;
use spark_codec_binary_fuzz::{FuzzRecord, check_round_trip};

/// 递归编解码的层数上限。更深的随机树只会测到调用栈，而不是编解码逻辑。
const MAX_TREE_DEPTH: usize = 64;

fuzz_target!(|record: FuzzRecord| {
    if record.tree.depth() > MAX_TREE_DEPTH {
        return;
    }
    check_round_trip(&record);
});
