//! Fixture threads for local development.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use threadline_persist::MessageRole;

pub struct SeedMessage {
    pub role: MessageRole,
    pub content: &'static str,
    pub created_at: DateTime<Utc>,
}

pub struct SeedData {
    pub name: &'static str,
    pub thread_id: &'static str,
    pub user_id: &'static str,
    pub is_private: bool,
    pub messages: Vec<SeedMessage>,
}

fn jst(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    FixedOffset::east_opt(9 * 3600)
        .and_then(|tz| tz.with_ymd_and_hms(year, month, day, hour, min, 0).single())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

fn user(content: &'static str, created_at: DateTime<Utc>) -> SeedMessage {
    SeedMessage {
        role: MessageRole::User,
        content,
        created_at,
    }
}

fn assistant(content: &'static str, created_at: DateTime<Utc>) -> SeedMessage {
    SeedMessage {
        role: MessageRole::Assistant,
        content,
        created_at,
    }
}

pub fn registry() -> Vec<SeedData> {
    vec![basic(), private()]
}

pub fn find(name: &str) -> Option<SeedData> {
    registry().into_iter().find(|s| s.name == name)
}

fn basic() -> SeedData {
    SeedData {
        name: "basic",
        thread_id: "basic-thread",
        user_id: "demo-user-001",
        is_private: false,
        messages: vec![
            user("こんにちは！", jst(2025, 12, 20, 14, 0)),
            assistant("こんにちは！何かお手伝いできることはありますか？", jst(2025, 12, 20, 14, 1)),
            user("今日の天気はどうかな？", jst(2025, 12, 20, 14, 5)),
            assistant(
                "申し訳ありませんが、私はリアルタイムの天気情報に直接アクセスすることはできません。お住まいの地域の天気予報アプリをご確認ください。",
                jst(2025, 12, 20, 14, 6),
            ),
            user("わかった、ありがとう。じゃあ、何か面白い雑学を教えて。", jst(2025, 12, 20, 14, 10)),
            assistant(
                "シロクマの毛は白ではなく、実は透明です。中が空洞になっていて光を反射するため白く見えるんですよ。",
                jst(2025, 12, 20, 14, 11),
            ),
        ],
    }
}

fn private() -> SeedData {
    SeedData {
        name: "private",
        thread_id: "private-project-thread",
        user_id: "demo-user-001",
        is_private: true,
        messages: vec![
            user("次の新製品プロジェクト「Project X」について内密に相談したい。", jst(2025, 12, 20, 15, 0)),
            assistant(
                "かしこまりました。「Project X」に関する情報は機密事項として扱います。具体的にどのような内容でお困りでしょうか？",
                jst(2025, 12, 20, 15, 5),
            ),
            user("まずは競合他社の分析から始めたい。A社とB社の最新の動向をまとめてくれるかな？", jst(2025, 12, 20, 15, 10)),
            assistant(
                "承知いたしました。A社は新しいAI統合ツールを発表し、B社はハードウェアの効率化に注力しています。比較レポートを作成します。",
                jst(2025, 12, 20, 15, 15),
            ),
            user("ありがとう。このスレッドは誰にも見られないように設定しておいて。", jst(2025, 12, 20, 15, 20)),
            assistant(
                "このスレッドはプライベート設定になっており、あなた以外はアクセスできません。",
                jst(2025, 12, 20, 15, 30),
            ),
        ],
    }
}
