// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的刑期/请求构造器
// ==========================================

use chrono::NaiveDate;
use release_dates_engine::domain::sentence::{
    BotusSentence, DetentionTrainingOrderSentence, ExtendedDeterminateSentence,
    StandardDeterminateSentence,
};
use release_dates_engine::{
    Booking, DurationUnit, Offence, Offender, RecallType, Sentence, SentenceDuration,
};
use uuid::Uuid;

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 创建测试用罪犯 (成年)
pub fn create_test_offender() -> Offender {
    Offender::new("A1234BC", ymd(1985, 3, 10))
}

/// 创建测试用标准定期刑
pub fn create_test_sds(
    months: u32,
    sentenced_at: NaiveDate,
    has_ora_licence: bool,
) -> Sentence {
    Sentence::StandardDeterminate(StandardDeterminateSentence {
        id: Uuid::new_v4(),
        offence: Offence::new(sentenced_at, "TH68010"),
        duration: SentenceDuration::of(months, DurationUnit::Months),
        sentenced_at,
        recall_type: None,
        consecutive_to: None,
        is_sds_plus: false,
        has_ora_licence,
    })
}

/// 创建带召回状态的标准定期刑
pub fn create_test_sds_recall(
    months: u32,
    sentenced_at: NaiveDate,
    recall_type: RecallType,
) -> Sentence {
    let mut sentence = create_test_sds(months, sentenced_at, true);
    if let Sentence::StandardDeterminate(ref mut s) = sentence {
        s.recall_type = Some(recall_type);
    }
    sentence
}

/// 创建测试用延长定期刑
pub fn create_test_eds(
    custodial_years: u32,
    extension_years: u32,
    sentenced_at: NaiveDate,
    automatic_release: bool,
) -> Sentence {
    Sentence::ExtendedDeterminate(ExtendedDeterminateSentence {
        id: Uuid::new_v4(),
        offence: Offence::new(sentenced_at, "SX03001"),
        custodial_duration: SentenceDuration::of(custodial_years, DurationUnit::Years),
        extension_duration: SentenceDuration::of(extension_years, DurationUnit::Years),
        sentenced_at,
        recall_type: None,
        consecutive_to: None,
        automatic_release,
    })
}

/// 创建测试用 DTO
pub fn create_test_dto(months: u32, sentenced_at: NaiveDate) -> Sentence {
    Sentence::DetentionTrainingOrder(DetentionTrainingOrderSentence {
        id: Uuid::new_v4(),
        offence: Offence::new(sentenced_at, "TH68010"),
        duration: SentenceDuration::of(months, DurationUnit::Months),
        sentenced_at,
        recall_type: None,
        consecutive_to: None,
    })
}

/// 创建测试用 BOTUS
pub fn create_test_botus(
    days: u32,
    sentenced_at: NaiveDate,
    historic_tused: Option<NaiveDate>,
) -> Sentence {
    Sentence::Botus(BotusSentence {
        id: Uuid::new_v4(),
        offence: Offence::new(sentenced_at, "TH68010"),
        duration: SentenceDuration::of(days, DurationUnit::Days),
        sentenced_at,
        recall_type: None,
        historic_tused,
    })
}

/// 把刑期挂到前驱之后 (连续刑链)
pub fn make_consecutive_to(sentence: &mut Sentence, target: Uuid) {
    match sentence {
        Sentence::StandardDeterminate(s) => s.consecutive_to = Some(target),
        Sentence::ExtendedDeterminate(s) => s.consecutive_to = Some(target),
        Sentence::Sopc(s) => s.consecutive_to = Some(target),
        Sentence::DetentionTrainingOrder(s) => s.consecutive_to = Some(target),
        _ => panic!("该变体不支持连续刑引用"),
    }
}

/// 创建测试用计算请求
pub fn create_test_booking(sentences: Vec<Sentence>) -> Booking {
    Booking::new(create_test_offender(), sentences)
}
