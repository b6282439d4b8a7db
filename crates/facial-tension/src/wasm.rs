//! 浏览器端绑定
//!
//! 关键点以扁平数组传入：[x0, y0, z0, x1, y1, z1, ...]，归一化坐标。

use wasm_bindgen::prelude::*;

use crate::config::EngineConfig;
use crate::error::TensionError;
use crate::landmarks::Landmarks;
use crate::session::PainSession;

fn to_js_error(err: TensionError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// 单个被测对象的疼痛评分引擎
#[wasm_bindgen]
pub struct PainEngine {
    session: PainSession,
}

impl PainEngine {
    fn frame(&self, flat: &[f64]) -> Result<Landmarks, JsValue> {
        Landmarks::from_flat(flat, self.session.config().landmark_count).map_err(to_js_error)
    }
}

#[wasm_bindgen]
impl PainEngine {
    /// `config` 为 undefined/null 时使用默认配置
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PainEngine, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| js_sys::Error::new(&format!("invalid config: {e}")))?
        };
        let session = PainSession::new(config).map_err(to_js_error)?;
        Ok(Self { session })
    }

    pub fn calibrate(&mut self, landmarks: &[f64]) -> Result<(), JsValue> {
        let frame = self.frame(landmarks)?;
        self.session.calibrate(&frame).map_err(to_js_error)
    }

    /// 返回序列化后的 FrameAnalysis
    #[wasm_bindgen(js_name = "processFrame")]
    pub fn process_frame(&mut self, landmarks: &[f64]) -> Result<JsValue, JsValue> {
        let frame = self.frame(landmarks)?;
        let analysis = self.session.process_frame(&frame).map_err(to_js_error)?;
        Ok(serde_wasm_bindgen::to_value(&analysis).unwrap_or(JsValue::NULL))
    }

    #[wasm_bindgen(js_name = "getAverages")]
    pub fn averages(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.session.averages()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = "isCalibrated")]
    pub fn is_calibrated(&self) -> bool {
        self.session.is_calibrated()
    }

    #[wasm_bindgen(js_name = "resetHistory")]
    pub fn reset_history(&mut self) {
        self.session.reset_history();
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }
}
