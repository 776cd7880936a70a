//! User guide, in English or Vietnamese.

struct Guide {
    title: &'static str,
    subtitle: &'static str,
    sections: &'static [(&'static str, &'static [&'static str])],
    tips: &'static [&'static str],
}

const EN: Guide = Guide {
    title: "DETAILED USER GUIDE",
    subtitle: "Sketch AI Storyboard - Professional Pre-production Workflow",
    sections: &[
        (
            "1. System Activation",
            &[
                "Get your API key from Google AI Studio (Gemini).",
                "Export it as GEMINI_API_KEY, put it in a .env file, or pass --api-key.",
                "Run `storyboard check-key` to confirm the key is valid.",
            ],
        ),
        (
            "2. Script Formatting",
            &[
                "Format: 'SCENE [Num] - [Location] - [Time]'.",
                "Include shot type keywords: WIDE SHOT, MEDIUM SHOT, CLOSE-UP.",
                "Describe actions clearly for better shot recognition.",
            ],
        ),
        (
            "3. Timeline & Sketching",
            &[
                "`storyboard analyze` breaks the script into acts, scenes and shots.",
                "`storyboard timeline --select <id>` inspects a shot; `edit-shot` adjusts it.",
                "`storyboard sketch <id>` draws one shot; `sketch-all` draws the rest.",
            ],
        ),
    ],
    tips: &[
        "Tip: `storyboard timeline --png strip.png --zoom-in 2` renders a wider strip.",
        "PDF Export: `storyboard export` packs every sketch and shot detail into one document.",
        "Save Project: the project file is plain JSON; keep it to resume work later.",
    ],
};

const VI: Guide = Guide {
    title: "HƯỚNG DẪN SỬ DỤNG CHI TIẾT",
    subtitle: "Sketch AI Storyboard - Workflow Tiền Kỳ Chuyên Nghiệp",
    sections: &[
        (
            "1. Kích hoạt Hệ thống",
            &[
                "Lấy API Key từ Google AI Studio (Gemini).",
                "Đặt Key vào biến GEMINI_API_KEY, file .env, hoặc truyền --api-key.",
                "Chạy `storyboard check-key` để kiểm tra tính hợp lệ.",
            ],
        ),
        (
            "2. Cấu trúc Kịch bản chuẩn",
            &[
                "Sử dụng định dạng: 'CẢNH [Số] - [Địa điểm] - [Thời gian]'.",
                "Nên bao gồm các từ khóa chỉ cỡ cảnh như: TOÀN CẢNH, TRUNG CẢNH, CẬN CẢNH, ĐẶC TẢ.",
                "Mô tả hành động cụ thể để nhận diện cú máy tốt hơn.",
            ],
        ),
        (
            "3. Quản lý Timeline & Sketch",
            &[
                "`storyboard analyze` tự động chia Act/Scene/Shot lên Timeline.",
                "`storyboard timeline --select <id>` xem chi tiết Shot; `edit-shot` để tùy chỉnh.",
                "`storyboard sketch <id>` vẽ một Shot; `sketch-all` vẽ hàng loạt phần còn lại.",
            ],
        ),
    ],
    tips: &[
        "Mẹo: `storyboard timeline --png strip.png --zoom-in 2` xuất Timeline rộng hơn.",
        "Xuất PDF: `storyboard export` đóng gói toàn bộ phác thảo và thông tin kỹ thuật.",
        "Lưu dự án: file dự án là JSON, giữ lại để tiếp tục làm việc vào lúc khác.",
    ],
};

pub fn run(lang: &str) -> anyhow::Result<()> {
    let guide = match lang {
        "en" => &EN,
        "vi" => &VI,
        other => anyhow::bail!("Unknown language: {other}. Use: en, vi"),
    };

    println!("{}", guide.title);
    println!("{}", guide.subtitle);
    println!("{}", "=".repeat(60));

    for (title, steps) in guide.sections {
        println!();
        println!("{title}");
        for step in steps.iter() {
            println!("  - {step}");
        }
    }

    println!();
    println!("PRO TIPS");
    for tip in guide.tips {
        println!("  * {tip}");
    }

    Ok(())
}
