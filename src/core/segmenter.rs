use crate::domain::model::MessageChunk;

/// 將 `body` 切成最少數量、每段最多 `max_chunk_length` 字元的連續片段
///
/// 長度以 `char` 計算，不會切在字元中間。依 `sequence_index` 串接即還原 `body`。
/// 空內容回傳單一空片段；上限為 0 時視為 1。
pub fn split(body: &str, max_chunk_length: usize) -> Vec<MessageChunk> {
    let max_chunk_length = max_chunk_length.max(1);

    if body.chars().count() <= max_chunk_length {
        return vec![MessageChunk {
            sequence_index: 0,
            text: body.to_string(),
        }];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for ch in body.chars() {
        if current_len == max_chunk_length {
            chunks.push(MessageChunk {
                sequence_index: chunks.len(),
                text: std::mem::take(&mut current),
            });
            current_len = 0;
        }
        current.push(ch);
        current_len += 1;
    }

    if !current.is_empty() {
        chunks.push(MessageChunk {
            sequence_index: chunks.len(),
            text: current,
        });
    }

    tracing::debug!(
        "Split {} characters into {} chunks of at most {}",
        body.chars().count(),
        chunks.len(),
        max_chunk_length
    );

    chunks
}
