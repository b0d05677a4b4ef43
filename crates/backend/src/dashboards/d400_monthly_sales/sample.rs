//! Example data shown when nothing has been uploaded.

/// Twelve months of 2024, revenue in KRW.
pub const SAMPLE_CSV: &str = "\
월,매출액,전년동월,증감률
2024-01,12000000,10500000,14.3
2024-02,13500000,11200000,20.5
2024-03,11000000,12800000,-14.1
2024-04,18000000,15200000,18.4
2024-05,21000000,18500000,13.5
2024-06,19000000,17000000,11.8
2024-07,17500000,16000000,9.4
2024-08,22000000,20000000,10.0
2024-09,24000000,21500000,11.6
2024-10,20000000,19800000,1.0
2024-11,23000000,21000000,9.5
2024-12,25000000,23500000,6.4
";
