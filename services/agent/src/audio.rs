//! Sample-format helpers for captured audio.

use std::io::Cursor;

/// Converts a slice of i16 samples to a vector of f32 samples.
pub fn convert_i16_to_f32(pcm16: &[i16]) -> Vec<f32> {
    pcm16
        .iter()
        .map(|&sample| sample as f32 / 32768.0)
        .collect()
}

/// Converts a slice of f32 samples to a vector of i16 samples.
pub fn convert_f32_to_i16(pcm32: &[f32]) -> Vec<i16> {
    pcm32
        .iter()
        .map(|&sample| (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16)
        .collect()
}

/// Averages interleaved frames down to a single channel.
pub fn downmix_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Root-mean-square level of a sample block; 0.0 for an empty block.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// Encodes mono f32 samples as an in-memory 16-bit PCM WAV file.
pub fn encode_wav_mono16(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for sample in convert_f32_to_i16(samples) {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_f32_to_i16() {
        let input = vec![1.0f32, -1.0f32, 0.0f32, 0.5f32];
        let result = convert_f32_to_i16(&input);

        assert_eq!(result.len(), 4);
        assert_eq!(result[0], i16::MAX);
        // -1.0 * 32767 = -32767, not i16::MIN (-32768)
        assert_eq!(result[1], -32767);
        assert_eq!(result[2], 0);
        assert_eq!(result[3], (0.5 * i16::MAX as f32) as i16);

        // Values outside the unit range are clamped
        let input = vec![2.0f32, -2.0f32];
        let result = convert_f32_to_i16(&input);
        assert_eq!(result[0], i16::MAX);
        assert_eq!(result[1], i16::MIN);

        assert!(convert_f32_to_i16(&[]).is_empty());
    }

    #[test]
    fn test_convert_i16_to_f32() {
        let input = vec![i16::MAX, i16::MIN, 0i16, 16384i16];
        let result = convert_i16_to_f32(&input);

        assert_eq!(result.len(), 4);
        assert!((result[0] - i16::MAX as f32 / 32768.0).abs() < 0.0001);
        assert!((result[1] + 1.0).abs() < 0.0001);
        assert!((result[2]).abs() < 0.0001);
        assert!((result[3] - 0.5).abs() < 0.0001);

        assert!(convert_i16_to_f32(&[]).is_empty());
    }

    #[test]
    fn test_downmix_mono() {
        // Stereo frames are averaged
        let stereo = vec![0.5f32, -0.5, 1.0, 0.0];
        assert_eq!(downmix_mono(&stereo, 2), vec![0.0, 0.5]);

        // Mono passes through unchanged
        let mono = vec![0.1f32, 0.2];
        assert_eq!(downmix_mono(&mono, 1), mono);

        // A trailing partial frame is dropped
        let ragged = vec![0.2f32, 0.2, 0.4];
        assert_eq!(downmix_mono(&ragged, 2), vec![0.2]);
    }

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms(&[0.0, 0.0]), 0.0);
        assert!((rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 0.0001);
        assert!(rms(&[1.0]) > rms(&[0.1]));
    }

    #[test]
    fn test_encode_wav_mono16_header() {
        let samples = vec![0.0f32; 480];
        let bytes = encode_wav_mono16(&samples, 48000).unwrap();

        // RIFF/WAVE header plus one i16 per sample
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), 44 + samples.len() * 2);
    }
}
