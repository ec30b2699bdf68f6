#![no_main]

use libfuzzer_sys::fuzz_target;

// 任意字节分别在约束下与默认上下文中解码：只允许中毒，不允许 panic、越界或无界分配。
fuzz_target!(|data: &[u8]| {
    spark_codec_binary_fuzz::decode_under_limits(data);
    spark_codec_binary_fuzz::decode_unbounded(data);
});
