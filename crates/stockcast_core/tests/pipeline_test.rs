use approx::assert_relative_eq;
use rand::{Rng, SeedableRng};
use stockcast_core::{
    ErrorKind, ForecastContext, ForecastError, ForecastResponse, HistoryBuffer, MinMaxScaler,
    ModelKind, PipelineConfig, ScaledWindow, SequenceModel, WindowBuilder, WINDOW_SIZE,
};

/// Echoes the scaled input's last time step.
struct EchoModel;

impl SequenceModel for EchoModel {
    fn predict(&self, window: &ScaledWindow) -> stockcast_core::Result<f64> {
        window
            .last_step()
            .ok_or_else(|| ForecastError::Inference("empty window".into()))
    }

    fn window_size(&self) -> usize {
        WINDOW_SIZE
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Persistence
    }
}

/// Always returns the same scaled value, whatever the input.
struct ConstantModel(f64);

impl SequenceModel for ConstantModel {
    fn predict(&self, _window: &ScaledWindow) -> stockcast_core::Result<f64> {
        Ok(self.0)
    }

    fn window_size(&self) -> usize {
        WINDOW_SIZE
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Onnx
    }
}

fn echo_context() -> ForecastContext {
    let scaler = MinMaxScaler::from_bounds([0.0, 0.0], [20.0, 20.0], (0.0, 1.0)).unwrap();
    let history = HistoryBuffer::from_series(&[10.0; WINDOW_SIZE - 1], WINDOW_SIZE).unwrap();
    ForecastContext::new(scaler, history, Box::new(EchoModel)).unwrap()
}

#[test]
fn test_echo_roundtrip_returns_input() {
    let ctx = echo_context();

    let forecast = ctx.forecast("10.0").unwrap();
    assert_relative_eq!(forecast.scaled, 0.5, epsilon = 1e-9);
    assert_relative_eq!(forecast.raw, 10.0, epsilon = 1e-9);
    assert_relative_eq!(forecast.prediction, 10.0, epsilon = 1e-9);

    assert_relative_eq!(ctx.forecast_value(10.0).unwrap(), 10.0, epsilon = 1e-9);
}

#[test]
fn test_any_finite_value_forecasts() {
    let ctx = echo_context();
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let v: f64 = rng.gen_range(-1.0e6..1.0e6);
        let forecast = ctx
            .forecast(&v.to_string())
            .unwrap_or_else(|e| panic!("forecast({}) failed: {}", v, e));
        assert!(forecast.prediction.is_finite());
        // Echo model + same bounds on both columns: identity up to rounding.
        assert!((forecast.raw - v).abs() < 1e-6 * v.abs().max(1.0));
    }
}

#[test]
fn test_non_numeric_input_is_an_error_result() {
    let ctx = echo_context();
    for bad in ["abc", "", "12x", "  ", "1,5", "ten"] {
        let err = ctx.forecast(bad).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInput(_)), "{:?}", bad);
        assert_eq!(ctx.respond(bad), Err(ErrorKind::InvalidInput));
    }
}

#[test]
fn test_forecast_is_deterministic() {
    let ctx = echo_context();
    let first = ctx.forecast("13.37").unwrap();
    for _ in 0..10 {
        assert_eq!(ctx.forecast("13.37").unwrap(), first);
    }
}

#[test]
fn test_history_prefix_is_not_updated_between_requests() {
    let ctx = echo_context();
    let before = ctx.history().prefix().to_vec();

    ctx.forecast("19.0").unwrap();
    let _ = ctx.forecast("bogus");

    assert_eq!(ctx.history().prefix(), before.as_slice());
}

#[test]
fn test_window_always_has_thirty_steps() {
    let scaler = MinMaxScaler::from_bounds([0.0, 0.0], [100.0, 100.0], (0.0, 1.0)).unwrap();
    for len in [29, 30, 31, 64, 500] {
        let series: Vec<f64> = (0..len).map(|i| i as f64 % 100.0).collect();
        let history = HistoryBuffer::from_series(&series, WINDOW_SIZE).unwrap();
        let window = WindowBuilder::new(&scaler, WINDOW_SIZE)
            .build(history.prefix(), 1.0)
            .unwrap();
        assert_eq!(window.shape(), [1, WINDOW_SIZE, 1], "source length {}", len);
    }
}

#[test]
fn test_prediction_is_read_from_second_column() {
    // Different bounds per column: the prediction must be inverse-scaled with column 1.
    let scaler = MinMaxScaler::from_bounds([0.0, 200.0], [10.0, 400.0], (0.0, 1.0)).unwrap();
    let history = HistoryBuffer::from_series(&[5.0; WINDOW_SIZE - 1], WINDOW_SIZE).unwrap();
    let ctx = ForecastContext::new(scaler, history, Box::new(ConstantModel(0.25))).unwrap();

    let forecast = ctx.forecast("5").unwrap();
    assert_relative_eq!(forecast.prediction, 250.0, epsilon = 1e-9);
}

#[test]
fn test_prediction_is_rounded_to_two_decimals() {
    let scaler = MinMaxScaler::from_bounds([0.0, 0.0], [1.0, 3.0], (0.0, 1.0)).unwrap();
    let history = HistoryBuffer::from_series(&[0.5; WINDOW_SIZE - 1], WINDOW_SIZE).unwrap();
    let ctx = ForecastContext::new(scaler, history, Box::new(ConstantModel(1.0 / 7.0))).unwrap();

    let forecast = ctx.forecast("0.5").unwrap();
    assert_relative_eq!(forecast.raw, 3.0 / 7.0, epsilon = 1e-12);
    assert_eq!(forecast.prediction, 0.43);
}

#[test]
fn test_load_context_from_artifacts() {
    let dir = tempfile::tempdir().unwrap();

    let history_path = dir.path().join("inventory.csv");
    let mut csv = String::from("Date,Consumption,Ending_Quantity\n");
    for day in 0..40 {
        csv.push_str(&format!("d{},10,{}\n", day, 1000 - day));
    }
    std::fs::write(&history_path, csv).unwrap();

    let scaler_path = dir.path().join("scaler.json");
    std::fs::write(
        &scaler_path,
        r#"{"feature_range": [0.0, 1.0], "data_min": [0.0, 0.0], "data_max": [20.0, 20.0]}"#,
    )
    .unwrap();

    let config = PipelineConfig {
        model: ModelKind::Persistence,
        model_path: dir.path().join("unused.onnx").display().to_string(),
        scaler_path: scaler_path.display().to_string(),
        history_path: history_path.display().to_string(),
        ..PipelineConfig::default()
    };

    let ctx = ForecastContext::load(&config).unwrap();
    assert_eq!(ctx.window_size(), WINDOW_SIZE);
    assert_eq!(ctx.history().source_rows(), 40);
    assert_eq!(ctx.model_kind(), ModelKind::Persistence);
    assert_relative_eq!(ctx.forecast("10").unwrap().prediction, 10.0, epsilon = 1e-9);
}

#[test]
fn test_startup_failures() {
    let dir = tempfile::tempdir().unwrap();

    let history_path = dir.path().join("short.csv");
    let mut csv = String::from("Consumption\n");
    for _ in 0..(WINDOW_SIZE - 2) {
        csv.push_str("1\n");
    }
    std::fs::write(&history_path, csv).unwrap();

    let scaler_path = dir.path().join("scaler.json");
    std::fs::write(
        &scaler_path,
        r#"{"data_min": [0.0, 0.0, 0.0], "data_max": [1.0, 1.0, 1.0]}"#,
    )
    .unwrap();

    let base = PipelineConfig {
        model: ModelKind::Persistence,
        scaler_path: scaler_path.display().to_string(),
        history_path: history_path.display().to_string(),
        ..PipelineConfig::default()
    };
    assert!(matches!(
        ForecastContext::load(&base),
        Err(ForecastError::InsufficientHistory { needed: 29, got: 28 })
    ));

    let mut csv = String::from("Consumption\n");
    for _ in 0..WINDOW_SIZE {
        csv.push_str("1\n");
    }
    std::fs::write(&history_path, csv).unwrap();
    assert!(matches!(
        ForecastContext::load(&base),
        Err(ForecastError::Config(_))
    ));

    std::fs::write(
        &scaler_path,
        r#"{"data_min": [0.0, 0.0], "data_max": [1.0, 1.0]}"#,
    )
    .unwrap();
    let onnx = PipelineConfig {
        model: ModelKind::Onnx,
        model_path: dir.path().join("missing.onnx").display().to_string(),
        ..base.clone()
    };
    assert!(matches!(
        ForecastContext::load(&onnx),
        Err(ForecastError::ModelLoad(_))
    ));
    assert!(ForecastContext::load(&base).is_ok());
}

#[test]
fn test_huge_finite_values_stay_finite() {
    let ctx = echo_context();
    let near_max = f64::MAX / 20.0;

    for v in [1e307, near_max, -near_max, 4.6e13, 1e300] {
        let forecast = ctx
            .forecast(&v.to_string())
            .unwrap_or_else(|e| panic!("forecast({}) failed: {}", v, e));
        assert!(forecast.prediction.is_finite(), "{} -> {}", v, forecast.prediction);
        assert!((forecast.prediction - v).abs() <= 1e-9 * v.abs());

        let response = ForecastResponse::from(ctx.respond(&v.to_string()));
        let body = serde_json::to_value(response).unwrap();
        assert!(body["prediction"].is_f64(), "{} -> {}", v, body);
    }
}

#[test]
fn test_non_finite_model_output_is_inference_error() {
    let scaler = MinMaxScaler::from_bounds([0.0, 0.0], [20.0, 20.0], (0.0, 1.0)).unwrap();
    for bad in [f64::NAN, f64::INFINITY] {
        let history = HistoryBuffer::from_series(&[10.0; WINDOW_SIZE - 1], WINDOW_SIZE).unwrap();
        let ctx =
            ForecastContext::new(scaler.clone(), history, Box::new(ConstantModel(bad))).unwrap();

        assert!(matches!(ctx.forecast("10"), Err(ForecastError::Inference(_))));
        assert!(matches!(ctx.forecast_value(10.0), Err(ForecastError::Inference(_))));
        assert_eq!(ctx.respond("10"), Err(ErrorKind::Inference));
    }
}

#[test]
fn test_onnx_context_echoes_through_tract() {
    let dir = tempfile::tempdir().unwrap();

    let history_path = dir.path().join("inventory.csv");
    let mut csv = String::from("Consumption\n");
    for _ in 0..WINDOW_SIZE {
        csv.push_str("10\n");
    }
    std::fs::write(&history_path, csv).unwrap();

    let scaler_path = dir.path().join("scaler.json");
    std::fs::write(
        &scaler_path,
        r#"{"data_min": [0.0, 0.0], "data_max": [20.0, 20.0]}"#,
    )
    .unwrap();

    let config = PipelineConfig {
        model: ModelKind::Onnx,
        model_path: concat!(env!("CARGO_MANIFEST_DIR"), "/assets/last_step.onnx").to_string(),
        scaler_path: scaler_path.display().to_string(),
        history_path: history_path.display().to_string(),
        ..PipelineConfig::default()
    };

    let ctx = ForecastContext::load(&config).unwrap();
    assert_eq!(ctx.model_kind(), ModelKind::Onnx);
    for v in [0.0, 7.25, 13.37, 19.99] {
        let forecast = ctx.forecast(&v.to_string()).unwrap();
        assert_relative_eq!(forecast.raw, v, epsilon = 1e-4);
        assert_relative_eq!(forecast.prediction, v, epsilon = 1e-4);
    }
}
