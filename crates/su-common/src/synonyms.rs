use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use unicode_normalization::UnicodeNormalization;

/// Canonical keyword → related terms (Korean/English).
///
/// Covers job functions, tech stack, personality descriptors, hobbies, office locations and
/// seniority. Terms are matched after NFKC + lowercase, so casing here is irrelevant.
static SYNONYM_CLUSTERS: &[(&str, &[&str])] = &[
    // Job functions
    ("개발자", &["developer", "engineer", "엔지니어", "프로그래머", "programmer", "개발", "sw"]),
    ("백엔드", &["backend", "back-end", "서버", "server", "api"]),
    ("프론트엔드", &["frontend", "front-end", "프론트", "웹개발", "web"]),
    ("풀스택", &["fullstack", "full-stack", "full stack"]),
    ("모바일", &["mobile", "앱개발", "ios", "android", "안드로이드"]),
    ("데이터엔지니어", &["data engineer", "데이터 엔지니어", "etl", "파이프라인", "pipeline"]),
    ("데이터분석", &["data analysis", "data analyst", "데이터 분석", "분석가", "analytics", "bi"]),
    ("데이터사이언스", &["data science", "data scientist", "데이터 사이언티스트", "통계", "statistics"]),
    ("인공지능", &["ai", "머신러닝", "machine learning", "ml", "딥러닝", "deep learning", "llm"]),
    ("데브옵스", &["devops", "sre", "ci/cd", "배포", "운영자동화"]),
    ("인프라", &["infra", "infrastructure", "클라우드", "cloud", "네트워크", "network"]),
    ("보안", &["security", "정보보안", "infosec", "보안엔지니어"]),
    ("qa", &["품질", "quality assurance", "테스트", "test", "testing", "테스터"]),
    ("pm", &["프로젝트매니저", "project manager", "프로젝트 관리", "일정관리"]),
    ("po", &["프로덕트오너", "product owner", "프로덕트매니저", "product manager", "제품"]),
    ("기획", &["기획자", "planning", "planner", "서비스기획", "전략기획"]),
    ("디자인", &["design", "designer", "디자이너", "시각디자인"]),
    ("ux", &["사용자경험", "user experience", "ux리서치", "ux research", "사용성"]),
    ("ui", &["user interface", "인터페이스", "gui", "화면설계"]),
    ("마케팅", &["marketing", "마케터", "marketer", "브랜딩", "branding", "광고", "growth"]),
    ("영업", &["sales", "세일즈", "비즈니스", "business development", "bd", "고객사"]),
    ("인사", &["hr", "human resources", "people", "채용", "recruiting", "리크루터"]),
    ("재무", &["finance", "파이낸스", "자금", "투자", "budget", "예산"]),
    ("회계", &["accounting", "accountant", "세무", "tax", "결산"]),
    ("법무", &["legal", "법률", "컴플라이언스", "compliance", "계약"]),
    ("총무", &["general affairs", "경영지원", "사무", "office management"]),
    ("고객지원", &["cs", "customer support", "customer success", "고객상담", "cx"]),
    ("연구", &["research", "r&d", "연구원", "researcher", "리서치"]),
    ("교육", &["education", "training", "강의", "lecture", "멘토링", "mentoring"]),
    ("전략", &["strategy", "사업전략", "경영전략", "consulting", "컨설팅"]),
    ("콘텐츠", &["content", "contents", "에디터", "editor", "작가", "copywriting"]),
    ("운영", &["operations", "ops", "오퍼레이션", "서비스운영"]),
    // Tech stack
    ("javascript", &["js", "자바스크립트", "ecmascript", "es6"]),
    ("typescript", &["ts", "타입스크립트"]),
    ("react", &["reactjs", "react.js", "리액트", "next.js", "nextjs"]),
    ("vue", &["vuejs", "vue.js", "뷰", "nuxt"]),
    ("angular", &["angularjs", "앵귤러"]),
    ("nodejs", &["node", "node.js", "노드", "express"]),
    ("python", &["파이썬", "py", "django", "flask", "fastapi"]),
    ("java", &["자바", "jvm", "spring", "스프링"]),
    ("kotlin", &["코틀린", "kt"]),
    ("swift", &["스위프트", "swiftui"]),
    ("golang", &["go", "고랭"]),
    ("rust", &["러스트", "rustlang"]),
    ("c++", &["cpp", "씨플플"]),
    ("c#", &["csharp", ".net", "dotnet", "닷넷"]),
    ("aws", &["amazon web services", "아마존웹서비스", "ec2", "s3", "lambda"]),
    ("gcp", &["google cloud", "구글클라우드", "bigquery", "빅쿼리"]),
    ("azure", &["애저", "microsoft azure"]),
    ("docker", &["도커", "container", "컨테이너"]),
    ("kubernetes", &["k8s", "쿠버네티스", "helm"]),
    ("sql", &["데이터베이스", "database", "db", "쿼리", "query"]),
    ("mysql", &["마이에스큐엘", "mariadb"]),
    ("postgresql", &["postgres", "포스트그레스", "pg"]),
    ("mongodb", &["mongo", "몽고디비", "nosql"]),
    ("redis", &["레디스", "cache", "캐시"]),
    ("git", &["github", "gitlab", "깃", "깃허브", "버전관리"]),
    ("figma", &["피그마", "sketch", "스케치", "프로토타입"]),
    ("excel", &["엑셀", "spreadsheet", "스프레드시트", "구글시트"]),
    ("tableau", &["태블로", "looker", "대시보드", "dashboard", "시각화"]),
    ("flutter", &["플러터", "dart"]),
    ("unity", &["유니티", "게임개발", "game dev"]),
    // Personality descriptors
    ("외향적", &["extrovert", "extroverted", "사교적", "활발", "outgoing", "에너지"]),
    ("내향적", &["introvert", "introverted", "차분", "조용", "신중"]),
    ("꼼꼼함", &["detail-oriented", "꼼꼼", "세심", "정확", "meticulous"]),
    ("창의적", &["creative", "창의", "아이디어", "idea", "혁신"]),
    ("논리적", &["logical", "분석적", "analytical", "체계적", "systematic"]),
    ("리더십", &["leadership", "리더", "leader", "주도적", "이끄는"]),
    ("협업", &["collaboration", "teamwork", "팀워크", "협력", "cooperation"]),
    ("소통", &["communication", "커뮤니케이션", "대화", "경청", "listening"]),
    ("긍정적", &["positive", "밝은", "낙천적", "optimistic"]),
    ("책임감", &["responsible", "responsibility", "성실", "diligent", "신뢰"]),
    ("열정", &["passion", "passionate", "열정적", "도전", "challenge"]),
    ("유머", &["humor", "재미", "유쾌", "funny"]),
    ("자기계발", &["self-development", "성장", "growth mindset", "학습", "learning", "공부"]),
    // Hobbies
    ("등산", &["hiking", "하이킹", "산행", "트레킹", "trekking", "mountain"]),
    ("러닝", &["running", "달리기", "조깅", "jogging", "마라톤", "marathon"]),
    ("헬스", &["fitness", "gym", "웨이트", "weight training", "운동", "workout", "크로스핏"]),
    ("요가", &["yoga", "명상", "meditation", "필라테스", "pilates"]),
    ("수영", &["swimming", "swim", "다이빙", "diving", "서핑", "surfing"]),
    ("자전거", &["cycling", "bike", "bicycle", "라이딩", "riding"]),
    ("축구", &["soccer", "football", "풋살", "futsal"]),
    ("농구", &["basketball", "nba"]),
    ("야구", &["baseball", "kbo", "직관"]),
    ("배드민턴", &["badminton"]),
    ("테니스", &["tennis", "탁구", "table tennis", "스쿼시"]),
    ("골프", &["golf", "스크린골프", "라운딩"]),
    ("볼링", &["bowling", "당구", "billiards"]),
    ("클라이밍", &["climbing", "bouldering", "볼더링", "암벽등반"]),
    ("캠핑", &["camping", "차박", "글램핑", "outdoor", "아웃도어"]),
    ("여행", &["travel", "traveling", "trip", "해외여행", "국내여행", "배낭여행"]),
    ("낚시", &["fishing", "바다낚시"]),
    ("독서", &["reading", "책", "book", "books", "북클럽", "book club"]),
    ("글쓰기", &["writing", "블로그", "blog", "에세이", "essay", "일기"]),
    ("영화", &["movie", "movies", "film", "cinema", "영화감상", "넷플릭스", "netflix"]),
    ("드라마", &["drama", "tv", "시리즈", "예능"]),
    ("음악", &["music", "음악감상", "공연", "concert", "콘서트", "페스티벌"]),
    ("노래", &["singing", "karaoke", "노래방", "보컬", "vocal"]),
    ("악기", &["instrument", "기타", "guitar", "피아노", "piano", "드럼", "drum", "밴드", "band"]),
    ("댄스", &["dance", "dancing", "춤", "스트릿댄스", "발레"]),
    ("그림", &["drawing", "painting", "미술", "art", "일러스트", "illustration", "드로잉"]),
    ("사진", &["photography", "photo", "카메라", "camera", "출사"]),
    ("요리", &["cooking", "cook", "쿠킹", "레시피", "recipe"]),
    ("베이킹", &["baking", "제빵", "디저트", "dessert", "케이크"]),
    ("커피", &["coffee", "카페", "cafe", "바리스타", "barista", "핸드드립"]),
    ("와인", &["wine", "술", "맥주", "beer", "위스키", "whisky", "칵테일"]),
    ("맛집", &["foodie", "맛집탐방", "미식", "gourmet", "먹방"]),
    ("게임", &["game", "gaming", "게이밍", "롤", "lol", "콘솔", "console", "스팀"]),
    ("보드게임", &["board game", "boardgame", "보드겜", "퍼즐", "puzzle", "체스", "바둑"]),
    ("반려동물", &["pet", "pets", "강아지", "dog", "고양이", "cat", "집사"]),
    ("봉사", &["volunteer", "volunteering", "봉사활동", "기부", "donation"]),
    ("외국어", &["language", "영어", "english", "일본어", "japanese", "중국어", "chinese", "회화"]),
    ("공예", &["craft", "crafts", "뜨개질", "knitting", "도자기", "pottery", "diy", "목공"]),
    ("패션", &["fashion", "쇼핑", "shopping", "스타일", "style"]),
    ("재테크", &["investment", "주식", "stock", "stocks", "부동산", "코인", "crypto", "경제"]),
    ("식물", &["plant", "plants", "가드닝", "gardening", "플랜테리어"]),
    ("전시", &["exhibition", "미술관", "museum", "박물관", "갤러리", "gallery"]),
    ("뮤지컬", &["musical", "연극", "theater", "theatre", "오페라"]),
    ("애니메이션", &["animation", "anime", "애니", "웹툰", "webtoon", "만화", "comics"]),
    // Office locations
    ("서울", &["seoul", "서울시"]),
    ("강남", &["gangnam", "역삼", "삼성동", "선릉"]),
    ("판교", &["pangyo", "분당", "성남"]),
    ("여의도", &["yeouido", "영등포"]),
    ("을지로", &["euljiro", "광화문", "종로", "시청"]),
    ("부산", &["busan", "센텀", "해운대"]),
    ("대전", &["daejeon", "대덕"]),
    ("대구", &["daegu"]),
    ("광주", &["gwangju"]),
    ("인천", &["incheon", "송도"]),
    ("제주", &["jeju", "제주도"]),
    ("재택", &["remote", "리모트", "원격근무", "wfh", "work from home", "재택근무"]),
    // Seniority
    ("인턴", &["intern", "internship", "인턴십"]),
    ("신입", &["new hire", "newcomer", "entry level", "입사", "신규입사자", "뉴비"]),
    ("주니어", &["junior", "jr", "사원"]),
    ("시니어", &["senior", "sr", "경력직", "베테랑", "veteran", "선임"]),
    ("리드", &["lead", "tech lead", "테크리드", "팀장", "파트장", "책임"]),
    ("매니저", &["manager", "관리자", "management", "팀리더", "team leader"]),
    ("임원", &["executive", "c-level", "director", "이사", "본부장", "vp"]),
];

/// NFKC, trimmed, lower-cased.
pub fn normalize_term(input: &str) -> String {
    input.nfkc().collect::<String>().trim().to_lowercase()
}

/// Canonical key → normalized synonyms.
static FORWARD: LazyLock<HashMap<String, Vec<String>>> = LazyLock::new(|| {
    SYNONYM_CLUSTERS
        .iter()
        .map(|(canonical, terms)| {
            (
                normalize_term(canonical),
                terms.iter().map(|t| normalize_term(t)).collect(),
            )
        })
        .collect()
});

/// Synonym → canonical keys listing it (a term may belong to several clusters).
static REVERSE: LazyLock<HashMap<String, Vec<String>>> = LazyLock::new(|| {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for (canonical, terms) in FORWARD.iter() {
        for term in terms {
            let owners = map.entry(term.clone()).or_default();
            if !owners.contains(canonical) {
                owners.push(canonical.clone());
            }
        }
    }
    map
});

/// Canonical keys of two or more characters, sorted, used for the substring pass.
static SUBSTRING_KEYS: LazyLock<Vec<String>> = LazyLock::new(|| {
    let mut keys: Vec<String> = FORWARD
        .keys()
        .filter(|key| key.chars().count() >= 2)
        .cloned()
        .collect();
    keys.sort();
    keys
});

/// Number of canonical clusters in the dictionary.
pub fn cluster_count() -> usize {
    FORWARD.len()
}

/// Synonyms registered under `canonical`, if it is a canonical key.
pub fn synonyms_of(canonical: &str) -> Option<&'static [String]> {
    FORWARD.get(&normalize_term(canonical)).map(Vec::as_slice)
}

/// Canonical keys that list `term` as a synonym.
pub fn canonicals_of(term: &str) -> &'static [String] {
    REVERSE
        .get(&normalize_term(term))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Canonical keys whose clusters `term` pulls in: its own key, the clusters listing it, and
/// for terms of two or more characters every canonical key containing it or contained in it.
fn related_clusters(term: &str) -> Vec<&'static String> {
    let mut clusters: Vec<&'static String> = Vec::new();
    if let Some((key, _)) = FORWARD.get_key_value(term) {
        clusters.push(key);
    }
    if let Some(owners) = REVERSE.get(term) {
        clusters.extend(owners.iter());
    }
    if term.chars().count() >= 2 {
        clusters.extend(
            SUBSTRING_KEYS
                .iter()
                .filter(|key| key.contains(term) || term.contains(key.as_str())),
        );
    }
    clusters
}

/// Expand keywords into a broad, lower-cased term set (recall over precision).
///
/// Every keyword pulls in the whole cluster of each canonical key related to it (see
/// [`related_clusters`]), and the newly added terms are expanded the same way until nothing
/// changes. The result is closed: expanding it again returns the same set.
pub fn expand_keywords<S: AsRef<str>>(keywords: &[S]) -> BTreeSet<String> {
    let mut expanded = BTreeSet::new();
    let mut pending: Vec<String> = keywords
        .iter()
        .map(|k| normalize_term(k.as_ref()))
        .filter(|k| !k.is_empty())
        .collect();

    while let Some(term) = pending.pop() {
        if expanded.contains(&term) {
            continue;
        }
        for canonical in related_clusters(&term) {
            let cluster = std::iter::once(canonical).chain(FORWARD.get(canonical).into_iter().flatten());
            pending.extend(cluster.filter(|t| !expanded.contains(*t)).cloned());
        }
        expanded.insert(term);
    }

    expanded
}

/// Fraction of the original keywords covered by `text`, counting synonym hits.
///
/// The denominator is the number of distinct original keywords, so expansion can only raise
/// recall; the result is capped at 1.0.
pub fn match_with_synonyms<S: AsRef<str>>(text: &str, keywords: &[S]) -> f64 {
    let originals: HashSet<String> = keywords
        .iter()
        .map(|k| normalize_term(k.as_ref()))
        .filter(|k| !k.is_empty())
        .collect();
    if originals.is_empty() {
        return 0.0;
    }

    let haystack = normalize_term(text);
    if haystack.is_empty() {
        return 0.0;
    }

    let matched = expand_keywords(keywords)
        .iter()
        .filter(|term| haystack.contains(term.as_str()))
        .count();

    (matched as f64 / originals.len() as f64).min(1.0)
}

/// Lower-cased, trimmed, non-empty tag set.
pub fn normalize_tags<'a, I>(tags: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    tags.into_iter()
        .map(|t| normalize_term(t))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Jaccard similarity over lower-cased tag sets; 0 when either side is empty.
pub fn jaccard<'a, A, B>(a: A, b: B) -> f64
where
    A: IntoIterator<Item = &'a String>,
    B: IntoIterator<Item = &'a String>,
{
    let a = normalize_tags(a);
    let b = normalize_tags(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    intersection as f64 / union as f64
}

/// Tags present on both sides (lower-cased, sorted).
pub fn common_tags<'a, A, B>(a: A, b: B) -> Vec<String>
where
    A: IntoIterator<Item = &'a String>,
    B: IntoIterator<Item = &'a String>,
{
    let a = normalize_tags(a);
    let b = normalize_tags(b);
    let mut common: Vec<String> = a.intersection(&b).cloned().collect();
    common.sort();
    common
}
